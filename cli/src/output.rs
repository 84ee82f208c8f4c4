use colored::Colorize;

const NAME_WIDTH: usize = 28;

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn field(name: &str, value: &str) {
    println!("{} {}", format!("{name}:").bold(), value);
}

pub fn hint(msg: &str) {
    println!("{} {}", "hint:".cyan().bold(), msg.dimmed());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

/// One indented `NAME  value` row, names padded to a shared column.
pub fn option_line(name: &str, value: impl std::fmt::Display) -> String {
    format!("  {name:<NAME_WIDTH$} {value}")
}
