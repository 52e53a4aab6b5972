mod account;
mod class;
mod pagination;
mod student;

pub use account::{Account, Role};
pub use class::{Class, Section};
pub use pagination::{PageMeta, Paginated};
pub use student::{
    AccountChanges, Gender, NewAccount, NewStudent, NewStudentProfile, ProfileChanges, Student,
    StudentAccount, StudentChanges, StudentProfile,
};
