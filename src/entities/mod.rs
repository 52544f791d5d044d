// Entity Models
//
// A student has a stable id and values (name, class, grade) that are
// replaced wholesale on update. The registry owns the ordered list.

pub mod student;

pub use student::{
    RegistryError, Student, StudentRegistry, ValidationError, CLASS_OPTIONS, GRADE_OPTIONS,
};
