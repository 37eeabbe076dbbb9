//! End-to-end tests running the built-in plugins through the kernel.

mod helpers;
mod lifecycle_test;
mod request_test;
