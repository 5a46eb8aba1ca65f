// External dictionary compiler and install step
//
// Both tools are opaque: a command either exits successfully or the whole
// run is aborted.

use crate::config::{Config, PathsConfig};
use crate::error::{Error, Result};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

const STYLESHEET: &str = include_str!("../data/RubyGemsDictionary.css");
const METADATA: &str = include_str!("../data/RubyGemsInfo.plist");

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<Path>) -> Self {
        self.args.push(arg.as_ref().display().to_string());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Shell-like rendering for log and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Executes external commands
pub trait CommandRunner {
    fn run(&mut self, command: &ExternalCommand) -> Result<()>;
}

/// Runs commands with `std::process`
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &ExternalCommand) -> Result<()> {
        debug!("running: {}", command.display());

        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }

        let status = process
            .status()
            .map_err(|e| Error::command_failed(command.display(), e.to_string()))?;
        if !status.success() {
            return Err(Error::command_failed(command.display(), status.to_string()));
        }
        Ok(())
    }
}

/// Stylesheet and metadata paths for the compiler, writing the embedded
/// defaults into the base directory when no override is configured
pub fn prepare_assets(paths: &PathsConfig) -> Result<(PathBuf, PathBuf)> {
    let data_dir = paths.base_dir.join("data");

    let stylesheet = match &paths.stylesheet {
        Some(path) => path.clone(),
        None => {
            fs::create_dir_all(&data_dir)?;
            let path = data_dir.join("RubyGemsDictionary.css");
            fs::write(&path, STYLESHEET)?;
            path
        }
    };

    let metadata = match &paths.metadata {
        Some(path) => path.clone(),
        None => {
            fs::create_dir_all(&data_dir)?;
            let path = data_dir.join("RubyGemsInfo.plist");
            fs::write(&path, METADATA)?;
            path
        }
    };

    for path in [&stylesheet, &metadata] {
        if !path.is_file() {
            return Err(Error::PathNotFound(path.clone()));
        }
    }

    Ok((stylesheet, metadata))
}

/// Compiler invocation: `-c=0 <name> <source> <stylesheet> <metadata>`,
/// run from the base directory so the bundle lands in `objects/`
pub fn compile_command(config: &Config, stylesheet: &Path, metadata: &Path) -> ExternalCommand {
    ExternalCommand::new(&config.build.compiler)
        .arg("-c=0")
        .arg(&config.build.dictionary_name)
        .arg(config.paths.source_document())
        .arg(stylesheet)
        .arg(metadata)
        .current_dir(&config.paths.base_dir)
}

/// Copy the compiled bundle into the install directory
pub fn install_command(config: &Config) -> ExternalCommand {
    ExternalCommand::new(&config.build.sync_command)
        .arg("-r")
        .arg(config.paths.bundle(&config.build.dictionary_name))
        .arg(&config.paths.install_dir)
}

/// Compile the assembled document into a bundle
pub fn build(config: &Config, runner: &mut dyn CommandRunner) -> Result<()> {
    let (stylesheet, metadata) = prepare_assets(&config.paths)?;
    runner.run(&compile_command(config, &stylesheet, &metadata))
}

/// Sync the bundle into the install directory
pub fn install(config: &Config, runner: &mut dyn CommandRunner) -> Result<()> {
    info!("installing");
    fs::create_dir_all(&config.paths.install_dir)?;
    runner.run(&install_command(config))?;

    // Dictionary.app only rescans when the install directory's mtime moves.
    filetime::set_file_mtime(&config.paths.install_dir, FileTime::now())?;
    info!("installed into {}", config.paths.install_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<ExternalCommand>,
    }

    impl CommandRunner for Recorder {
        fn run(&mut self, command: &ExternalCommand) -> Result<()> {
            self.calls.push(command.clone());
            Ok(())
        }
    }

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.base_dir = dir.path().join("ri");
        config.paths.install_dir = dir.path().join("Dictionaries");
        config
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = ExternalCommand::new("/opt/build dict.sh").arg("-c=0").arg("My Dict");
        assert_eq!(cmd.display(), "\"/opt/build dict.sh\" \"-c=0\" \"My Dict\"");
    }

    #[test]
    fn test_compile_command() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let cmd = compile_command(&config, Path::new("/d/a.css"), Path::new("/d/b.plist"));
        assert_eq!(cmd.program, config.build.compiler);
        assert_eq!(cmd.args[0], "-c=0");
        assert_eq!(cmd.args[1], "RubyAndGems");
        assert_eq!(
            cmd.args[2],
            config.paths.source_document().display().to_string()
        );
        assert_eq!(cmd.args[3], "/d/a.css");
        assert_eq!(cmd.args[4], "/d/b.plist");
        assert_eq!(cmd.current_dir, Some(config.paths.base_dir.clone()));
    }

    #[test]
    fn test_install_command() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let cmd = install_command(&config);
        assert_eq!(cmd.program, PathBuf::from("rsync"));
        assert_eq!(cmd.args[0], "-r");
        assert!(cmd.args[1].ends_with("objects/RubyAndGems.dictionary"));
        assert_eq!(cmd.args[2], config.paths.install_dir.display().to_string());
    }

    #[test]
    fn test_prepare_assets_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let (css, plist) = prepare_assets(&config.paths).unwrap();
        assert!(std::fs::read_to_string(css).unwrap().contains("DictionaryService"));
        assert!(std::fs::read_to_string(plist)
            .unwrap()
            .contains("front_back_matter"));
    }

    #[test]
    fn test_prepare_assets_missing_override() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.paths.stylesheet = Some(dir.path().join("missing.css"));
        assert!(matches!(
            prepare_assets(&config.paths),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_build_and_install_run_commands() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let mut recorder = Recorder::default();
        build(&config, &mut recorder).unwrap();

        std::fs::create_dir_all(&config.paths.install_dir).unwrap();
        let stale = FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&config.paths.install_dir, stale).unwrap();

        install(&config, &mut recorder).unwrap();
        assert_eq!(recorder.calls.len(), 2);
        assert!(config.paths.install_dir.is_dir());

        let meta = std::fs::metadata(&config.paths.install_dir).unwrap();
        assert!(FileTime::from_last_modification_time(&meta) > stale);
    }

    #[test]
    fn test_system_runner_reports_failure() {
        let mut runner = SystemRunner;
        let err = runner
            .run(&ExternalCommand::new("/nonexistent/build_dict.sh"))
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
