//! CLI for the `paramstore` binary.
//!
//! `main` parses the arguments and hands a [`CliCommand::Run`] to [`run`],
//! which reads once, prints the result and optionally keeps watching:
//!
//! ```ignore
//! use paramstore::cli::{parse_args, run, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Run(options) => run(options).await?,
//!     _ => {}
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, CliOptions, USAGE};
pub use version::{handle_version_command, version_string, VERSION};

use color_eyre::Result;

use crate::paramstore::{flatten, strip_prefix, ChangeEvent, NestedConfig, ParamStore, ParamStoreConfig};

/// Prefix removed by `--strip-prefix`: the path with a trailing delimiter.
pub fn key_prefix(path: &str, delimiter: &str) -> String {
    if delimiter.is_empty() || path.ends_with(delimiter) {
        path.to_string()
    } else {
        format!("{}{}", path, delimiter)
    }
}

/// Render a read result as pretty JSON, or as sorted `key=value` lines.
pub fn render_config(config: &NestedConfig, flat: bool, delimiter: &str) -> Result<String> {
    if flat {
        let mut entries = flatten(config, delimiter);
        entries.sort();
        Ok(entries
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n"))
    } else {
        Ok(serde_json::to_string_pretty(config)?)
    }
}

/// One JSON line per change event.
pub fn render_event(event: &ChangeEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Read once, print, and with `--watch` stream change events until Ctrl-C.
pub async fn run(options: CliOptions) -> Result<()> {
    let config = options.apply(ParamStoreConfig::from_env()?);
    let transform = options
        .strip_prefix
        .then(|| strip_prefix(key_prefix(&config.path, &config.delimiter)));
    let delimiter = config.delimiter.clone();

    let store = ParamStore::new(config, transform)?;
    let settings = store.read().await?;
    println!("{}", render_config(&settings, options.flat, &delimiter)?);

    if !options.watch {
        return Ok(());
    }

    let (handle, mut notifications) = store.subscribe()?;
    tracing::info!(
        "Watching {} every {}s, Ctrl-C to stop",
        store.config().path,
        handle.interval().as_secs()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(notification) = notifications.recv() => match notification {
                Ok(event) => println!("{}", render_event(&event)?),
                Err(e) => tracing::warn!("{} ({})", e, e.recovery_hint()),
            },
        }
    }

    handle.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paramstore::{unflatten, ParameterRecord};

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("/app/prod", "/"), "/app/prod/");
        assert_eq!(key_prefix("/app/prod/", "/"), "/app/prod/");
        assert_eq!(key_prefix("app", ""), "app");
    }

    #[test]
    fn test_render_flat_is_sorted() {
        let config = unflatten(
            vec![
                ("db/port".to_string(), "5432".to_string()),
                ("db/host".to_string(), "h".to_string()),
            ],
            "/",
        );

        assert_eq!(
            render_config(&config, true, "/").unwrap(),
            "db/host=h\ndb/port=5432"
        );
    }

    #[test]
    fn test_render_nested_json() {
        let config = unflatten(vec![("a/b".to_string(), "c".to_string())], "/");
        let rendered = render_config(&config, false, "/").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["a"]["b"], "c");
    }

    #[test]
    fn test_render_event_is_single_line() {
        let event = ChangeEvent::from_changes(vec![ParameterRecord::new("/a", "1", "arn:a", 2)]).unwrap();
        let line = render_event(&event).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"identity\":\"arn:a\""));
    }
}
