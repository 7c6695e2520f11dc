// Filesystem families organization

pub mod fat;
