mod common;
mod overflow;
