//! Log records emitted by an end-to-end generation run.
//!
//! `logtest` installs a process-wide logger, so this binary holds a single
//! test.

use camino::{Utf8Path, Utf8PathBuf};
use llpkg_generator::config::GeneratorSettings;
use llpkg_generator::exec::Invocation;
use llpkg_generator::test_utils::{ScriptedExecutor, success_output};
use llpkg_generator::workflow::Workflow;
use log::Level;
use logtest::Logger;
use std::fs;
use std::io;
use std::process::Output;
use tempfile::TempDir;

fn fake_tools(invocation: &Invocation) -> io::Result<Output> {
    let cwd = invocation
        .working_dir()
        .map(Utf8Path::to_path_buf)
        .unwrap_or_default();
    match invocation.program() {
        "conan" if invocation.arguments().first().is_some_and(|a| a == "install") => {
            let out = invocation.arguments().last().expect("output folder");
            fs::write(Utf8Path::new(out).join("zlib.pc"), "Name: zlib")?;
            Ok(success_output())
        }
        "conan" => Ok(success_output()),
        "llcppg" => {
            fs::create_dir_all(cwd.join("zlib"))?;
            fs::write(cwd.join("zlib/zlib.go"), "package zlib\n")?;
            Ok(Output {
                stdout: b"generating zlib\n".to_vec(),
                ..success_output()
            })
        }
        other => Err(io::Error::new(io::ErrorKind::NotFound, other.to_owned())),
    }
}

#[test]
fn generation_logs_milestones() {
    let mut logger = Logger::start();

    let dir = TempDir::new().expect("temp dir");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path not UTF-8");
    fs::write(
        path.join("llpkg.cfg"),
        r#"{"upstream": {"package": {"name": "zlib", "version": "1.3.1"}}}"#,
    )
    .expect("write llpkg.cfg");
    fs::write(path.join("llcppg.cfg"), "{}").expect("write llcppg.cfg");

    let settings = GeneratorSettings::default();
    let executor = ScriptedExecutor::new(fake_tools);
    Workflow::new(&settings, &executor)
        .generate_dir(&path)
        .expect("generate should succeed");

    let mut messages = Vec::new();
    while let Some(record) = logger.pop() {
        messages.push((record.level(), record.args().to_string()));
    }

    let logged = |level: Level, needle: &str| {
        messages
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    };
    assert!(logged(Level::Info, "Start to generate zlib"), "{messages:?}");
    assert!(logged(Level::Debug, "llcppg: generating zlib"), "{messages:?}");
    assert!(logged(Level::Info, "merged 1 file(s)"), "{messages:?}");
}
