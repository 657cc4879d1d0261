//! Template rendering command.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use wikiprep_core::{process_template, TemplateConfig, TemplateVars};

/// Options for rendering a template
#[derive(Debug, Default)]
pub struct RenderOptions {
    pub assignments: Vec<String>,
    pub vars_file: Option<PathBuf>,
    pub stamp_date: bool,
}

/// Render `template_path` and write the result to stdout
pub fn render_template(template_path: &Path, opts: RenderOptions) -> Result<()> {
    if !template_path.is_file() {
        anyhow::bail!("Template file '{}' not found", template_path.display());
    }

    let vars = collect_vars(&opts)?;
    tracing::debug!("Rendering {:?} with {} variables", template_path, vars.len());

    let template = fs::read_to_string(template_path)
        .with_context(|| format!("Failed to read {:?}", template_path))?;
    let rendered = process_template(&template, &vars);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;
    Ok(())
}

/// Merge variables from the config file and the command line
fn collect_vars(opts: &RenderOptions) -> Result<TemplateVars> {
    let config = match &opts.vars_file {
        Some(path) => {
            tracing::info!("Loading variables from {:?}", path);
            TemplateConfig::from_file(path)
                .with_context(|| format!("Failed to load variables file {:?}", path))?
        }
        None => TemplateConfig::default(),
    };

    let mut vars = config
        .template_vars()
        .context("Invalid variables file")?;
    vars.extend(TemplateVars::from_assignments(&opts.assignments));

    if opts.stamp_date {
        config
            .stamp_generation_date(&mut vars, Utc::now())
            .context("Failed to stamp generation date")?;
    }

    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_command_line_overrides_file() {
        let dir = tempdir().unwrap();
        let vars_path = dir.path().join("vars.yml");
        fs::write(&vars_path, "variables:\n  TITLE: From File\n  REPO: owner/repo\n").unwrap();

        let opts = RenderOptions {
            assignments: vec!["TITLE=From Args".into()],
            vars_file: Some(vars_path),
            stamp_date: false,
        };
        let vars = collect_vars(&opts).unwrap();
        assert_eq!(vars.get("TITLE"), Some("From Args"));
        assert_eq!(vars.get("REPO"), Some("owner/repo"));
        assert!(!vars.contains("GENERATION_DATE"));
    }

    #[test]
    fn test_stamp_date_sets_generation_date() {
        let opts = RenderOptions {
            stamp_date: true,
            ..Default::default()
        };
        let vars = collect_vars(&opts).unwrap();
        assert!(vars.get("GENERATION_DATE").is_some_and(|d| d.ends_with("UTC")));
    }

    #[test]
    fn test_missing_vars_file_is_an_error() {
        let opts = RenderOptions {
            vars_file: Some(PathBuf::from("/nonexistent/vars.yml")),
            ..Default::default()
        };
        assert!(collect_vars(&opts).is_err());
    }
}
