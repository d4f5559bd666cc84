use crate::core_error::ShareError;

/// Splits a command line into its keyword and the rest of the line.
///
/// Exactly one separator is dropped; the argument keeps every other space, so
/// `GET my file.txt` names `my file.txt` and `GET  a.txt` names ` a.txt`.
pub fn parse_command_line(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.split_once(|c: char| c.is_whitespace()) {
        Some((cmd, arg)) => (cmd, arg),
        None => (line, ""),
    }
}

/// Rejects anything that could name a file outside the flat share directory.
pub fn validate_filename(name: &str) -> Result<&str, ShareError> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(ShareError::InvalidFilename(name.to_string()));
    }
    Ok(name)
}

/// Command line as it may appear in logs, with AUTH passwords masked.
pub fn redact_command_line(line: &str) -> String {
    let (cmd, arg) = parse_command_line(line);
    if cmd != "AUTH" {
        return line.to_string();
    }
    match arg.split_whitespace().next() {
        Some(user) => format!("AUTH {} ****", user),
        None => String::from("AUTH"),
    }
}
