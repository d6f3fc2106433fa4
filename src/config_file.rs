use anyhow::{anyhow, bail, Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name searched for in the working directory and its ancestors
pub const PROJECT_CONFIG_NAME: &str = ".txsumrc";

const MAX_ALIAS_DEPTH: usize = 10;

/// `.txsumrc` style configuration: default arguments plus named aliases
///
/// ```ini
/// defaults = --workers 4 --stats
///
/// [aliases]
/// fast = --workers 8 --compact
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: BTreeMap<String, String>,
    /// Files this configuration was read from, lowest precedence first
    pub sources: Vec<PathBuf>,
}

impl ConfigFile {
    /// Walk up from `start` looking for a project `.txsumrc`
    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    pub fn find_project_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::find_project_config_from(&cwd)
    }

    /// User config locations in order of preference
    pub fn user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("txsum").join("config.ini"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(PROJECT_CONFIG_NAME));
        }
        paths
    }

    /// Load the first existing user config, then overlay the project config
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_paths().into_iter().find(|p| p.is_file()) {
            config = config.overlay(Self::load_from_path(&user_path)?);
        }

        if let Some(project_path) = Self::find_project_config() {
            // A project file in $HOME is also the legacy user file; don't apply it twice
            if !config.sources.contains(&project_path) {
                config = config.overlay(Self::load_from_path(&project_path)?);
            }
        }

        Ok(config)
    }

    /// Load only `custom_path` when given, otherwise the normal search
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.sources.push(path.to_path_buf());
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse INI content. `;` and `#` start comment lines.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name != "aliases" {
                    log::warn!("ignoring unknown config section [{}]", name);
                }
                section = Some(name.to_string());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected 'key = value', got '{}'", index + 1, line))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                bail!("line {}: missing key before '='", index + 1);
            }

            match section.as_deref() {
                None if key == "defaults" => config.defaults = Some(value.to_string()),
                None => log::warn!("ignoring unknown config key '{}'", key),
                Some("aliases") => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                Some(_) => {}
            }
        }

        Ok(config)
    }

    /// Layer `other` on top of `self`; `other` wins on conflicts
    fn overlay(mut self, other: Self) -> Self {
        if other.defaults.is_some() {
            self.defaults = other.defaults;
        }
        self.aliases.extend(other.aliases);
        self.sources.extend(other.sources);
        self
    }

    /// Expand an alias into arguments, following nested `-a` references
    pub fn resolve_alias(&self, name: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        self.expand_alias(name, &mut chain)
    }

    fn expand_alias(&self, name: &str, chain: &mut Vec<String>) -> Result<Vec<String>> {
        if chain.len() >= MAX_ALIAS_DEPTH {
            bail!("Alias chain too deep: {}", chain.join(" -> "));
        }
        if chain.iter().any(|seen| seen == name) {
            bail!(
                "Circular alias reference: {} -> {}",
                chain.join(" -> "),
                name
            );
        }

        let value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let args = shell_words::split(value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;

        chain.push(name.to_string());
        let expanded = self.expand_args(args, chain)?;
        chain.pop();
        Ok(expanded)
    }

    fn expand_args(&self, args: Vec<String>, chain: &mut Vec<String>) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let alias = if arg == "-a" || arg == "--alias" {
                iter.next()
            } else {
                arg.strip_prefix("--alias=").map(str::to_string)
            };
            match alias {
                Some(name) => result.extend(self.expand_alias(&name, chain)?),
                // A trailing `-a` is left for clap to report
                None => result.push(arg),
            }
        }
        Ok(result)
    }

    /// Insert `defaults` after the program name, then expand every alias
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut iter = args.into_iter();
        let mut combined: Vec<String> = iter.next().into_iter().collect();

        if let Some(defaults) = &self.defaults {
            let default_args = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            combined.extend(default_args);
        }
        combined.extend(iter);

        let mut chain = Vec::new();
        self.expand_args(combined, &mut chain)
    }

    /// Human-readable report for `--show-config`
    pub fn describe(&self, custom_path: Option<&Path>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Configuration precedence: CLI > project {} > user config > defaults\n",
            PROJECT_CONFIG_NAME
        );

        if self.sources.is_empty() {
            let _ = writeln!(out, "No configuration files found. Using defaults.");
        } else {
            let _ = writeln!(out, "Configuration loaded from:");
            for source in &self.sources {
                let _ = writeln!(out, "  {}", source.display());
            }
        }

        if let Some(defaults) = &self.defaults {
            let _ = writeln!(out, "\nActive defaults:\n  defaults = {}", defaults);
        }
        if !self.aliases.is_empty() {
            let _ = writeln!(out, "\nActive aliases:");
            for (name, value) in &self.aliases {
                let _ = writeln!(out, "  {} = {}", name, value);
            }
        }

        let _ = writeln!(out, "\nConfiguration search locations (in precedence order):");
        match custom_path {
            Some(path) => {
                let _ = writeln!(out, "  1. Custom: {} {}", path.display(), found(path));
            }
            None => {
                match Self::find_project_config() {
                    Some(path) => {
                        let _ = writeln!(out, "  1. Project: {} (found)", path.display());
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "  1. Project: {} (searched up directory tree, not found)",
                            PROJECT_CONFIG_NAME
                        );
                    }
                }
                for (i, path) in Self::user_config_paths().iter().enumerate() {
                    let _ = writeln!(out, "  {}. User: {} {}", i + 2, path.display(), found(path));
                }
            }
        }

        if self.sources.is_empty() {
            let _ = writeln!(out, "\nExample configuration file ({}):\n", PROJECT_CONFIG_NAME);
            let _ = writeln!(out, "# Arguments applied to every txsum command");
            let _ = writeln!(out, "defaults = --workers 4 --stats\n");
            let _ = writeln!(out, "[aliases]");
            let _ = writeln!(out, "fast = --workers 16 --compact");
            let _ = writeln!(out, "report = --stats --output summary.json");
        }

        out
    }
}

fn found(path: &Path) -> &'static str {
    if path.is_file() {
        "(found)"
    } else {
        "(not found)"
    }
}
