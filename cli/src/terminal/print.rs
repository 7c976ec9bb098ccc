use colored::*;
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "lanprobe::print";
pub const RAW_FIELD: &str = "raw_msg";

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

/// Writes a line as is, bypassing the level prefix.
pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(q_level: u8) {
    if q_level == 0 {
        let title = format!("⟦ LANPROBE v{} ⟧ ", env!("CARGO_PKG_VERSION"));
        print(&rule(&title, "═"));
    }
}

pub fn header(msg: &str, q_level: u8) {
    if q_level == 0 {
        print(&rule(&format!("⟦ {} ⟧", msg.to_uppercase()), "─"));
    }
}

pub fn fat_separator() {
    print(&format!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}

/// `title` centered in a `fill` line of [`TOTAL_WIDTH`] columns.
fn rule(title: &str, fill: &str) -> String {
    let spare = TOTAL_WIDTH.saturating_sub(console::measure_text_width(title));
    let left = spare / 2;
    format!(
        "{}{}{}",
        fill.repeat(left).color(colors::SEPARATOR),
        title.color(colors::PRIMARY).bold(),
        fill.repeat(spare - left).color(colors::SEPARATOR)
    )
}

/// `key` padded with dots to `width` columns, then a colon.
fn dotted(key: &str, width: usize, key_color: Color) -> String {
    let dots = ".".repeat(width.saturating_sub(console::measure_text_width(key)) + 1);
    format!(
        "{}{}{}",
        key.color(key_color),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    )
}

fn aligned(key: &str, value: &ColoredString, key_width: usize) -> String {
    format!(
        "{} {} {}",
        ">".color(colors::SEPARATOR),
        dotted(key, key_width, colors::PRIMARY),
        value
    )
}

/// `> key.....: value`, with the dots filling up to `key_width`.
pub fn aligned_line(key: &str, value: ColoredString, key_width: usize) {
    print(&aligned(key, &value, key_width));
}

pub fn host_heading(idx: usize, name: &str) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

fn tree_lines(details: &[(String, ColoredString)]) -> Vec<String> {
    let key_width = details
        .iter()
        .map(|(key, _)| console::measure_text_width(key))
        .max()
        .unwrap_or(0);

    details
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let branch = if i + 1 == details.len() { "└─" } else { "├─" };
            format!(
                " {} {} {}",
                branch.color(colors::SEPARATOR),
                dotted(key, key_width, colors::TEXT_DEFAULT),
                value
            )
        })
        .collect()
}

/// One branch per detail under the last [`host_heading`].
pub fn host_details(details: &[(String, ColoredString)]) {
    for line in tree_lines(details) {
        print(&line);
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

const NO_RESULTS: &str = r#"
         _   _  ___    _   _  ___  ____ _____ ____
        | \ | |/ _ \  | | | |/ _ \/ ___|_   _/ ___|
        |  \| | | | | | |_| | | | \___ \ | | \___ \
        | |\  | |_| | |  _  | |_| |___) || |  ___) |
        |_| \_|\___/  |_| |_|\___/|____/ |_| |____/
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS.red().bold()));
}
