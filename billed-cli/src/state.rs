use anyhow::{Context, Result};
use billed_core::session::{self, Session};
use std::fs;
use std::path::PathBuf;

/// `$BILLED_HOME`, or `~/.billed`
pub fn billed_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BILLED_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".billed"))
}

pub fn ensure_billed_home() -> Result<PathBuf> {
    let dir = billed_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn session_path() -> Result<PathBuf> {
    Ok(ensure_billed_home()?.join("user.json"))
}

pub fn read_session() -> Result<Session> {
    let p = session_path()?;
    session::load_session(&p)
        .with_context(|| format!("read {} (run: billed login --email <you>)", p.display()))
}

pub fn write_session(s: &Session) -> Result<()> {
    let p = session_path()?;
    session::save_session(&p, s).with_context(|| format!("write {}", p.display()))
}

pub fn clear_session() -> Result<()> {
    let p = session_path()?;
    session::clear_session(&p).with_context(|| format!("remove {}", p.display()))
}
