pub mod cell;
pub mod coords;
pub mod defect;
pub mod layout;
pub mod truth_table;
