use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};

fn prompt(input: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

pub fn run(explicit: Option<&Path>) -> Result<()> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    let stdin = io::stdin();
    let mut input = stdin.lock();

    if config_path.exists() {
        let answer = prompt(
            &mut input,
            &format!(
                "Config file already exists at {}. Overwrite? [y/N] ",
                config_path.display()
            ),
        )?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("sprint-metrics Configuration");
    println!("============================\n");

    let base_url = prompt(&mut input, "Jira base URL (e.g. https://jira.example.com/jira): ")?;
    if base_url.is_empty() {
        return Err(Error::MissingConfig("base_url"));
    }
    let username = prompt(&mut input, "Jira username [optional, or set JIRA_USERNAME]: ")?;
    let board_id = prompt(&mut input, "Board id [optional]: ")?;
    let project = prompt(&mut input, "Project key [optional]: ")?;
    let sprint_name = prompt(&mut input, "Default sprint name [optional]: ")?;

    let contents = render(&base_url, &username, &board_id, &project, &sprint_name);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
            path: config_path.clone(),
            source: e,
        })?;
    }
    std::fs::write(&config_path, contents).map_err(|e| Error::FileWrite {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Set JIRA_PASSWORD in your environment before running 'sprint-metrics sprint'.");

    Ok(())
}

fn render(base_url: &str, username: &str, board_id: &str, project: &str, sprint: &str) -> String {
    let mut out = format!("base_url = {}\n", toml_string(base_url));
    if !username.is_empty() {
        out.push_str(&format!("username = {}\n", toml_string(username)));
    }
    if let Ok(board_id) = board_id.parse::<u64>() {
        out.push_str(&format!("board_id = {board_id}\n"));
    }
    if !project.is_empty() {
        out.push_str(&format!("project = {}\n", toml_string(project)));
    }
    if !sprint.is_empty() {
        out.push_str(&format!("sprint_name = {}\n", toml_string(sprint)));
    }
    out.push_str(
        r#"
[calendar]
weekends = ["Saturday", "Sunday"]
holiday_region = "japan"

[[calendar.work_hours]]
start = "09:00"
end = "18:00"
"#,
    );
    out
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn rendered_config_parses_back() {
        let text = render(
            "https://jira.example.com/jira",
            "sato",
            "42",
            "EVASS",
            "Sprint \"12\"",
        );
        let config = Config::parse(&text, PathBuf::from("config.toml")).unwrap();
        assert_eq!(config.base_url().unwrap(), "https://jira.example.com/jira");
        assert_eq!(config.username.as_deref(), Some("sato"));
        assert_eq!(config.board_id, Some(42));
        assert_eq!(config.sprint_name.as_deref(), Some("Sprint \"12\""));
        assert_eq!(config.calendar.work_hours[0].end, "18:00");
    }

    #[test]
    fn optional_fields_are_left_out() {
        let text = render("https://jira.example.com", "", "not-a-number", "", "");
        let config = Config::parse(&text, PathBuf::from("config.toml")).unwrap();
        assert!(config.username.is_none());
        assert!(config.board_id.is_none());
    }
}
