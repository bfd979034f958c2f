//! Step banners in the release log

use tracing::info;

const WIDTH: usize = 80;

/// The `####` rule framing a banner
pub fn rule() -> String {
  "#".repeat(WIDTH)
}

/// Log `title` framed by two rules, marking the start of a step
pub fn banner(title: &str) {
  let rule = rule();
  info!("{}", rule);
  info!("# {}", title);
  info!("{}", rule);
}
