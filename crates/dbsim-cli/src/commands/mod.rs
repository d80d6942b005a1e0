pub mod defect_influence;
pub mod domain;
pub mod operational;
pub mod simulate;
pub mod stability;
