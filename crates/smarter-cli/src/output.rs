use crate::cli::OutputFormat;
use colored::Colorize;
use serde_json::Value;
use smarter_broker::CommandResponse;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_response(response: &CommandResponse, format: OutputFormat) {
    if let Some(error) = response.error() {
        print_error(&format!(
            "{} ({}, status {})",
            error.description, error.error_class, error.status
        ));
        if let Some(trace) = &error.stack_trace {
            eprintln!("{}", trace.dimmed());
        }
        return;
    }
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(response) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => print_error(&format!("failed to render response: {e}")),
        },
        OutputFormat::Yaml => match serde_yaml::to_string(response) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => print_error(&format!("failed to render response: {e}")),
        },
        OutputFormat::Table => {
            print_as_table(response);
            print_success(&response.message);
        }
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_as_table(response: &CommandResponse) {
    let Some(data) = &response.data else {
        return;
    };
    if let Some(items) = data.get("items").and_then(|v| v.as_array()) {
        if items.is_empty() {
            println!("No resources found.");
            return;
        }
        let mut builder = Builder::default();
        builder.push_record(["NAME", "DESCRIPTION", "VERSION", "MODIFIED"]);
        for item in items {
            builder.push_record([
                item_str(item, &["metadata", "name"]),
                item_str(item, &["metadata", "description"]),
                item_str(item, &["metadata", "version"]),
                item_str(item, &["status", "modified"]),
            ]);
        }
        let table = builder.build().with(Style::rounded()).to_string();
        println!("{table}");
        if let Some(count) = response.metadata.count {
            println!("Total: {count}");
        }
    } else {
        // Single document: show the identity line, then the payload.
        let name = item_str(data, &["metadata", "name"]);
        if name != "-" {
            println!(
                "{} {}/{}",
                "Resource:".cyan(),
                response.thing.to_string().cyan(),
                name.cyan()
            );
        }
        match serde_json::to_string_pretty(data) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => print_error(&format!("failed to render data: {e}")),
        }
    }
}

fn item_str<'a>(value: &'a Value, path: &[&str]) -> &'a str {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return "-",
        }
    }
    current.as_str().unwrap_or("-")
}
