//! Integration tests driving the deb-release binary against local git repositories

mod helpers;
mod test_steps;
