// Data models - one module per PostgreSQL table (SeaORM entities),
// plus the request/response DTOs used by the routes.
//
//   - users        : accounts (email is the login identity)
//   - course       : courses, owned by the user who created them
//   - lesson       : lessons inside a course, owned like courses
//   - subscription : (user, course) join rows, toggled on and off
//   - payment      : payment records pointing at a course or a lesson
//   - dto          : request/response types for the API

pub mod course;
pub mod dto;
pub mod lesson;
pub mod payment;
pub mod subscription;
pub mod users;
