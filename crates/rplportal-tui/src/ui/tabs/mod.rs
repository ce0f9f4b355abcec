//! Dashboard-specific content rendering.

pub mod assessor;
pub mod enroll;
pub mod management;
pub mod student_home;
pub mod students;
