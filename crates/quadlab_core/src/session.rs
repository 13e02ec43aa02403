//! Command dispatch over the GPU-independent part of engine state.
//!
//! `Session` owns the current `ResourceConfig` and the time model. Anything
//! that needs the GPU goes through `RenderHost`, which the viewer implements
//! over its renderer and tests implement with a recorder.

use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::config::{ConfigError, ResourceConfig};
use crate::status::ExitStatus;
use crate::time::TimeState;

pub trait RenderHost {
    /// Decode and upload a new texture. Failures keep the current texture.
    fn reload_texture(&mut self, path: &Path);
    /// Rebuild the shader program from source files.
    fn reload_shaders(&mut self, vert: &Path, frag: &Path);
    /// Drop the current program without building a new one.
    fn invalidate_shaders(&mut self);
    /// Capture the next presented frame.
    fn request_screenshot(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(ExitStatus),
}

pub struct Session {
    config_path: PathBuf,
    config: ResourceConfig,
    pub time: TimeState,
}

impl Session {
    /// Load the config for the first time. Failing here is fatal for the caller.
    pub fn start(config_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = config_path.into();
        let config = ResourceConfig::load(&config_path)?;
        config.report();
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: ResourceConfig) -> Self {
        Self {
            config_path: config.path().to_path_buf(),
            config,
            time: TimeState::new(),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Push the configured texture and shaders into the host. Texture first;
    /// the two are independent and either may fail alone.
    pub fn load_resources(&self, host: &mut impl RenderHost) {
        match self.config.texture_path() {
            Some(texture) => host.reload_texture(texture),
            None => log::error!(
                "{}: no `texture` key, keeping current texture",
                self.config_path.display()
            ),
        }

        match (self.config.vert_path(), self.config.frag_path()) {
            (Some(vert), Some(frag)) => host.reload_shaders(vert, frag),
            _ => {
                log::error!(
                    "{}: both `vert` and `frag` are required to build a shader program",
                    self.config_path.display()
                );
                host.invalidate_shaders();
            }
        }
    }

    pub fn dispatch(&mut self, command: Command, host: &mut impl RenderHost) -> Flow {
        match command {
            Command::Reload => {
                self.reload(host);
            }
            Command::Screenshot => host.request_screenshot(),
            Command::TogglePause => {
                let paused = self.time.toggle_pause();
                log::info!(
                    "Time {} at {:.3}",
                    if paused { "PAUSED" } else { "RESUMED" },
                    self.time.time
                );
            }
            Command::ScrubTime(direction) => {
                if self.time.scrub(direction) {
                    log::info!("Time scrubbed to {:.3}", self.time.time);
                }
            }
            Command::Quit => return Flow::Exit(ExitStatus::ForcedQuit),
        }
        Flow::Continue
    }

    /// Re-read the config and reload everything it names. When the config
    /// cannot be read the reload stops and nothing is touched.
    pub fn reload(&mut self, host: &mut impl RenderHost) -> bool {
        match ResourceConfig::load(&self.config_path) {
            Ok(config) => {
                config.report();
                self.config = config;
                self.load_resources(host);
                true
            }
            Err(err) => {
                log::error!("Reload aborted: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ScrubDirection;
    use std::fs;

    #[derive(Debug, PartialEq)]
    enum Call {
        Texture(PathBuf),
        Shaders(PathBuf, PathBuf),
        Invalidate,
        Screenshot,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl RenderHost for Recorder {
        fn reload_texture(&mut self, path: &Path) {
            self.calls.push(Call::Texture(path.to_path_buf()));
        }

        fn reload_shaders(&mut self, vert: &Path, frag: &Path) {
            self.calls
                .push(Call::Shaders(vert.to_path_buf(), frag.to_path_buf()));
        }

        fn invalidate_shaders(&mut self) {
            self.calls.push(Call::Invalidate);
        }

        fn request_screenshot(&mut self) {
            self.calls.push(Call::Screenshot);
        }
    }

    fn session_from(text: &str) -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.conf");
        fs::write(&path, text).unwrap();
        let session = Session::start(&path).unwrap();
        (dir, session)
    }

    #[test]
    fn start_fails_without_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Session::start(dir.path().join("missing.conf")).is_err());
    }

    #[test]
    fn load_resources_orders_texture_before_shaders() {
        let (_dir, session) = session_from("vert = v.wgsl\nfrag = f.wgsl\ntexture = t.png\n");
        let mut host = Recorder::default();
        session.load_resources(&mut host);
        assert_eq!(
            host.calls,
            vec![
                Call::Texture(PathBuf::from("t.png")),
                Call::Shaders(PathBuf::from("v.wgsl"), PathBuf::from("f.wgsl")),
            ]
        );
    }

    #[test]
    fn missing_shader_key_invalidates_program() {
        let (_dir, session) = session_from("vert = v.wgsl\ntexture = t.png\n");
        let mut host = Recorder::default();
        session.load_resources(&mut host);
        assert_eq!(
            host.calls,
            vec![Call::Texture(PathBuf::from("t.png")), Call::Invalidate]
        );
    }

    #[test]
    fn missing_texture_key_still_loads_shaders() {
        let (_dir, session) = session_from("vert = v.wgsl\nfrag = f.wgsl\n");
        let mut host = Recorder::default();
        session.load_resources(&mut host);
        assert_eq!(
            host.calls,
            vec![Call::Shaders(PathBuf::from("v.wgsl"), PathBuf::from("f.wgsl"))]
        );
    }

    #[test]
    fn reload_picks_up_edited_config() {
        let (dir, mut session) = session_from("vert = a.wgsl\nfrag = b.wgsl\ntexture = t.png\n");
        fs::write(
            dir.path().join("render.conf"),
            "vert = c.wgsl\nfrag = d.wgsl\ntexture = u.png\n",
        )
        .unwrap();

        let mut host = Recorder::default();
        assert_eq!(session.dispatch(Command::Reload, &mut host), Flow::Continue);
        assert_eq!(
            host.calls,
            vec![
                Call::Texture(PathBuf::from("u.png")),
                Call::Shaders(PathBuf::from("c.wgsl"), PathBuf::from("d.wgsl")),
            ]
        );
        assert_eq!(session.config().vert_path(), Some(Path::new("c.wgsl")));
    }

    #[test]
    fn reload_with_unreadable_config_touches_nothing() {
        let (dir, mut session) = session_from("vert = a.wgsl\nfrag = b.wgsl\n");
        fs::remove_file(dir.path().join("render.conf")).unwrap();

        let mut host = Recorder::default();
        assert!(!session.reload(&mut host));
        assert!(host.calls.is_empty());
        assert_eq!(session.config().vert_path(), Some(Path::new("a.wgsl")));
    }

    #[test]
    fn screenshot_is_delegated() {
        let (_dir, mut session) = session_from("");
        let mut host = Recorder::default();
        session.dispatch(Command::Screenshot, &mut host);
        assert_eq!(host.calls, vec![Call::Screenshot]);
    }

    #[test]
    fn scrub_only_applies_while_paused() {
        let (_dir, mut session) = session_from("");
        let mut host = Recorder::default();
        session.time.time = 5.0;

        session.dispatch(Command::ScrubTime(ScrubDirection::Forward), &mut host);
        assert_eq!(session.time.time, 5.0);

        session.dispatch(Command::TogglePause, &mut host);
        session.dispatch(Command::ScrubTime(ScrubDirection::Forward), &mut host);
        assert!((session.time.time - 5.1).abs() < 1e-9);

        session.dispatch(Command::ScrubTime(ScrubDirection::Backward), &mut host);
        session.dispatch(Command::ScrubTime(ScrubDirection::Backward), &mut host);
        assert!((session.time.time - 4.9).abs() < 1e-9);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn quit_exits_with_forced_status() {
        let (_dir, mut session) = session_from("");
        let mut host = Recorder::default();
        assert_eq!(
            session.dispatch(Command::Quit, &mut host),
            Flow::Exit(ExitStatus::ForcedQuit)
        );
    }
}
