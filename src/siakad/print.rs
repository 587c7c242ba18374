use chrono::{DateTime, Utc};
use colored::Colorize;
use siakad::model::{SessionIdentity, StudentRecord};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const ID_WIDTH: usize = 8;
const NIM_WIDTH: usize = 12;
const NAME_WIDTH: usize = 32;

pub(crate) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(crate) fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub(crate) fn print_students(students: &[StudentRecord]) {
    if students.is_empty() {
        println!("No students found.");
        return;
    }

    for student in students {
        let id: String = student.id.as_str().chars().take(ID_WIDTH).collect();
        let nim = pad_to_width(&truncate_to_width(&student.nim, NIM_WIDTH), NIM_WIDTH);
        let nama = pad_to_width(&truncate_to_width(&student.nama, NAME_WIDTH), NAME_WIDTH);

        let fixed = ID_WIDTH + NIM_WIDTH + NAME_WIDTH + TIME_WIDTH + 4;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let jurusan = truncate_to_width(&student.jurusan, available);
        let padding = available.saturating_sub(jurusan.width());

        println!(
            "{} {} {} {}{} {}",
            id.yellow(),
            nim,
            nama.bold(),
            jurusan,
            " ".repeat(padding),
            format_time_ago(student.created_at).dimmed()
        );
    }
}

pub(crate) fn print_student(student: &StudentRecord) {
    println!("{} {}", student.nim.yellow(), student.nama.bold());
    println!("--------------------------------");
    let rows = [
        ("ID", Some(student.id.as_str())),
        ("Jurusan", Some(student.jurusan.as_str())),
        ("Angkatan", student.angkatan.as_deref()),
        ("Email", student.email.as_deref()),
        ("Telepon", student.telepon.as_deref()),
        ("Alamat", student.alamat.as_deref()),
    ];
    for (label, value) in rows {
        println!("{:<10}{}", label.dimmed(), value.unwrap_or("-"));
    }
    println!(
        "{:<10}{}",
        "Dibuat".dimmed(),
        format_time_ago(student.created_at).trim_start()
    );
    println!(
        "{:<10}{}",
        "Diubah".dimmed(),
        format_time_ago(student.updated_at).trim_start()
    );
}

pub(crate) fn print_identity(identity: &SessionIdentity) {
    println!(
        "{} <{}>  {}",
        identity.display_name.bold(),
        identity.email,
        identity.uid.dimmed()
    );
}

fn pad_to_width(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
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
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
