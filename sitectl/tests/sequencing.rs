//! Sequencing tests for `build`, `serve`, and `deploy`.
//!
//! Drive the orchestration functions with scripted tools against a scratch
//! site and check what ran, in which order, and what landed on disk.

use std::ffi::OsString;
use std::fs;

use sitectl::build::run_build;
use sitectl::deploy::run_deploy;
use sitectl::error::SiteError;
use sitectl::serve::run_serve;
use sitectl::test_support::{
    FAKE_BUNDLE, FAKE_WASM, RecordingServer, ScriptedToolchain, TestSite,
};

fn args(list: &[&str]) -> Vec<OsString> {
    list.iter().map(OsString::from).collect()
}

fn failed_code(err: &anyhow::Error) -> Option<i32> {
    err.chain().find_map(|cause| match cause.downcast_ref::<SiteError>() {
        Some(SiteError::ProcessFailed { code, .. }) => *code,
        _ => None,
    })
}

/// `build --release`: packager gets the mode flag, wasm and bundle land in
/// `public/`, and every static file is merged in.
#[test]
fn release_build_produces_full_output() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project);

    let report = run_build(&project, &tools, &args(&["--release"])).expect("build");

    let calls = tools.calls();
    assert_eq!(tools.programs(), vec!["wasm-pack", "rollup"]);
    assert_eq!(
        calls[0].args,
        vec!["build", "--no-typescript", "--target", "web", "--release"]
    );
    assert_eq!(
        calls[1].args,
        vec!["src/main.js", "--format", "iife", "--file", "public/caniuse_rs.js"]
    );

    let public = site.path().join("public");
    assert_eq!(report.wasm, public.join("caniuse_rs.wasm"));
    assert_eq!(report.static_files, 3);
    assert_eq!(fs::read(public.join("caniuse_rs.wasm")).expect("wasm"), FAKE_WASM);
    assert_eq!(
        fs::read_to_string(public.join("caniuse_rs.js")).expect("bundle"),
        FAKE_BUNDLE
    );
    assert!(public.join("index.html").is_file());
    assert!(public.join("style.css").is_file());
    assert!(public.join("img/logo.svg").is_file());
}

#[test]
fn packager_failure_short_circuits_build() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project).fail_on("wasm-pack", 101);

    let err = run_build(&project, &tools, &[]).unwrap_err();

    assert_eq!(failed_code(&err), Some(101));
    assert_eq!(tools.programs(), vec!["wasm-pack"]);
    assert!(!site.path().join("public").exists());
}

#[test]
fn bundler_failure_skips_static_copy() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project).fail_on("rollup", 1);

    let err = run_build(&project, &tools, &[]).unwrap_err();

    assert_eq!(failed_code(&err), Some(1));
    let public = site.path().join("public");
    // The wasm copy already happened and is left in place.
    assert!(public.join("caniuse_rs.wasm").is_file());
    assert!(!public.join("index.html").exists());
}

#[test]
fn missing_static_dir_fails_after_tools_ran() {
    let site = TestSite::new().expect("site");
    fs::remove_dir_all(site.path().join("static")).expect("remove static");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project);

    let err = run_build(&project, &tools, &[]).unwrap_err();

    assert!(format!("{err:#}").contains("static"));
    assert_eq!(tools.programs(), vec!["wasm-pack", "rollup"]);
}

#[test]
fn rebuild_is_idempotent() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let public = site.path().join("public");

    run_build(&project, &ScriptedToolchain::new(&project), &[]).expect("first build");
    let first = site.snapshot(&public).expect("snapshot");
    run_build(&project, &ScriptedToolchain::new(&project), &[]).expect("second build");
    let second = site.snapshot(&public).expect("snapshot");

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn serve_starts_server_on_output_after_build() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project);
    let server = RecordingServer::default();

    run_serve(&project, &tools, &server, &args(&["--dev"])).expect("serve");

    assert_eq!(tools.calls()[0].args.last().expect("arg"), "--dev");
    assert_eq!(server.starts(), 1);
    assert_eq!(server.served(), Some(site.path().join("public")));
}

#[test]
fn serve_never_starts_server_when_build_fails() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project).fail_on("rollup", 2);
    let server = RecordingServer::default();

    let err = run_serve(&project, &tools, &server, &[]).unwrap_err();

    assert_eq!(failed_code(&err), Some(2));
    assert_eq!(server.starts(), 0);
}

#[test]
fn deploy_syncs_then_swaps_web_root() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project);

    run_deploy(&project, &tools, &[]).expect("deploy");

    assert_eq!(tools.programs(), vec!["wasm-pack", "rollup", "rsync", "ssh"]);
    let calls = tools.calls();
    assert_eq!(calls[2].args, vec!["-rzz", "public", "caniuse.rs:/tmp/caniuse/"]);
    assert_eq!(calls[3].args[0], "caniuse.rs");
    let script = calls[3].args[1].to_string_lossy();
    assert!(script.contains("set -e"));
    assert!(script.contains("sudo rsync -r --delete /tmp/caniuse/public/* /srv/http/caniuse.rs/"));
}

/// A broken connection to the host fails the sync; the remote script never
/// runs and the freshly built output stays on disk.
#[test]
fn deploy_sync_failure_skips_remote_shell() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project).fail_on("rsync", 12);

    let err = run_deploy(&project, &tools, &[]).unwrap_err();

    assert_eq!(failed_code(&err), Some(12));
    assert_eq!(tools.programs(), vec!["wasm-pack", "rollup", "rsync"]);
    let public = site.path().join("public");
    assert!(public.join("caniuse_rs.wasm").is_file());
    assert!(public.join("caniuse_rs.js").is_file());
    assert!(public.join("index.html").is_file());
}

#[test]
fn deploy_build_failure_never_touches_remote() {
    let site = TestSite::new().expect("site");
    let project = site.project();
    let tools = ScriptedToolchain::new(&project).fail_on("wasm-pack", 1);

    run_deploy(&project, &tools, &[]).unwrap_err();

    assert_eq!(tools.programs(), vec!["wasm-pack"]);
}
