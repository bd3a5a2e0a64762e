pub mod gbm;
pub mod option;
