//! Terminal output for students, forms, toasts and the shell screen.
//!
//! Layout math (widths, truncation) stays here; the library only hands over data.

use chrono::{DateTime, Utc};
use colored::Colorize;
use rollbook::api::{CmdMessage, MessageLevel};
use rollbook::dialog::DeleteDialog;
use rollbook::form::StudentForm;
use rollbook::model::{Field, Student};
use rollbook::notify::Toast;
use rollbook::view::StudentView;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 6;
const ROLL_WIDTH: usize = 16;
const NAME_WIDTH: usize = 28;
const TIME_WIDTH: usize = 16;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", styled(message.level, &message.content));
    }
}

pub fn print_toasts(toasts: &[Toast]) {
    for toast in toasts {
        println!("{}", styled(toast.level, &toast.message));
    }
}

fn styled(level: MessageLevel, content: &str) -> colored::ColoredString {
    match level {
        MessageLevel::Info => content.dimmed(),
        MessageLevel::Success => content.green(),
        MessageLevel::Warning => content.yellow(),
        MessageLevel::Error => content.red(),
    }
}

pub fn print_students(students: &[Student], empty_message: &str) {
    if students.is_empty() {
        println!("{}", empty_message.dimmed());
        return;
    }

    for student in students {
        println!("{}", student_line(student));
    }
}

fn student_line(student: &Student) -> String {
    let id = pad_to(&format!("{}.", student.id), ID_WIDTH);
    let roll = pad_to(&truncate_to_width(&student.roll_number, ROLL_WIDTH), ROLL_WIDTH);
    let name = pad_to(&truncate_to_width(&student.name, NAME_WIDTH), NAME_WIDTH);

    let fixed = ID_WIDTH + ROLL_WIDTH + NAME_WIDTH + TIME_WIDTH;
    let email_width = LINE_WIDTH.saturating_sub(fixed);
    let email = pad_to(&truncate_to_width(&student.email, email_width), email_width);

    let time_ago = format!(
        "{:>width$}",
        format_time_ago(student.created_at),
        width = TIME_WIDTH
    );

    format!(
        "{}{}{}{}{}",
        id.yellow(),
        roll.bold(),
        name,
        email.dimmed(),
        time_ago.dimmed()
    )
}

/// Numbered roll-number list, as shown by the shell's list toggle.
pub fn print_roll_numbers(students: &[Student]) {
    println!("{}", "Student Roll Numbers".bold());
    if students.is_empty() {
        println!("{}", "No students found".dimmed());
        return;
    }
    for (i, student) in students.iter().enumerate() {
        println!(
            "  {:>3}  {}  {}",
            (i + 1).to_string().dimmed(),
            student.roll_number.bold(),
            format!("(id {})", student.id).dimmed()
        );
    }
}

pub fn print_student_detail(student: &Student) {
    println!("{}", "Student Details".bold().underline());
    let initial = student
        .name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    println!("  [{}] {}", initial.cyan().bold(), student.name.bold());
    println!("  {:<12} {}", "ID".dimmed(), student.id);
    println!("  {:<12} {}", "Email".dimmed(), student.email);
    println!("  {:<12} {}", "Roll Number".dimmed(), student.roll_number);
    println!(
        "  {:<12} {} ({})",
        "Created".dimmed(),
        student.created_at.format("%Y-%m-%d %H:%M"),
        format_time_ago(student.created_at).trim()
    );
    println!(
        "  {:<12} {} ({})",
        "Updated".dimmed(),
        student.updated_at.format("%Y-%m-%d %H:%M"),
        format_time_ago(student.updated_at).trim()
    );
}

/// Prints every visible field error of a form, then its submit error.
pub fn print_form_errors(form: &StudentForm) {
    for field in Field::ALL {
        if let Some(err) = form.visible_error(field) {
            eprintln!("{} {}", format!("{}:", field.label()).red().bold(), err.red());
        }
    }
    if let Some(err) = form.submit_error() {
        eprintln!("{}", err.red());
    }
}

pub fn print_delete_dialog(dialog: &DeleteDialog) {
    println!("{}", dialog.title().red().bold());
    println!("{}", dialog.prompt());
    println!("  {}", dialog.summary().bold());
}

/// The shell's screen: counters, the active list and the detail panel.
pub fn print_view(view: &StudentView) {
    let mut header = format!("Total Students: {}", view.total_count());
    if view.is_searching() {
        header.push_str(&format!(
            "   Searching: \"{}\" ({} found)",
            view.search_term(),
            view.results().len()
        ));
    }
    println!("{}", header.cyan());

    if let Some(err) = view.load_error() {
        println!("{}", err.red());
    }

    if view.is_searching() {
        print_students(view.results(), view.empty_message().unwrap_or_default());
    } else if view.show_list() {
        print_roll_numbers(view.all_students());
    }

    if let Some(student) = view.selected() {
        println!();
        print_student_detail(student);
    }
}

fn pad_to(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() < max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(2) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_to_width("CS-001", 16), "CS-001");
    }

    #[test]
    fn long_strings_end_with_ellipsis() {
        let out = truncate_to_width("Augusta Ada King, Countess of Lovelace", 12);
        assert!(out.ends_with('…'));
        assert!(out.width() < 12);
    }

    #[test]
    fn pad_fills_to_width() {
        assert_eq!(pad_to("ab", 5), "ab   ");
        assert_eq!(pad_to("abcdef", 3), "abcdef");
    }
}
