mod pages;
mod records;
mod run;

pub use run::run;
