//! Behaviour-driven tests for generation and tree verification.
//!
//! These scenarios cover equal trees, mismatched, missing and unexpected
//! files, the hashable-path filter and the missing-configuration failure.

use camino::{Utf8Path, Utf8PathBuf};
use llpkg_generator::config::GeneratorSettings;
use llpkg_generator::context::{GenerationContext, SCRATCH_PREFIX, ScratchDir};
use llpkg_generator::error::{GeneratorError, Stage};
use llpkg_generator::exec::Invocation;
use llpkg_generator::llcppg::LlcppgGenerator;
use llpkg_generator::package_name::PackageName;
use llpkg_generator::test_utils::{ScriptedExecutor, StubExecutor};
use llpkg_generator::verification::VerificationOutcome;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use tempfile::TempDir;

const FOO: &str = "package foo\n\nfunc Foo() {}\n";
const BAR: &str = "package foo\n\nfunc Bar() {}\n";
const GO_MOD: &str = "module github.com/luoliwoshang/goplus-llpkg/foo\n\ngo 1.20\n";

struct CheckWorld {
    submitted: TempDir,
    generated: TempDir,
    outcome: RefCell<Option<Result<VerificationOutcome, GeneratorError>>>,
    generate_result: RefCell<Option<Result<(), GeneratorError>>>,
    invocations: Cell<usize>,
}

impl Default for CheckWorld {
    fn default() -> Self {
        Self {
            submitted: TempDir::new().expect("failed to create temp dir"),
            generated: TempDir::new().expect("failed to create temp dir"),
            outcome: RefCell::new(None),
            generate_result: RefCell::new(None),
            invocations: Cell::new(0),
        }
    }
}

impl CheckWorld {
    fn submitted_path(&self) -> Utf8PathBuf {
        utf8(&self.submitted)
    }

    fn generated_path(&self) -> Utf8PathBuf {
        utf8(&self.generated)
    }

    fn context(&self) -> GenerationContext {
        let scratch = ScratchDir::new(SCRATCH_PREFIX).expect("failed to create scratch dir");
        let package = PackageName::try_from("foo").expect("valid package name");
        GenerationContext::new(self.submitted_path(), package, scratch)
    }

    fn violations(&self) -> llpkg_generator::verification::Violations {
        let outcome = self.outcome.borrow();
        let outcome = outcome.as_ref().expect("trees not checked");
        let outcome = outcome.as_ref().expect("check should succeed");
        outcome.violations().cloned().expect("expected violations")
    }
}

fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path not UTF-8")
}

fn write(root: &Utf8Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent");
    }
    fs::write(path, contents).expect("failed to write file");
}

fn write_package(root: &Utf8Path) {
    write(root, "foo.go", FOO);
    write(root, "bar.go", BAR);
    write(root, "go.mod", GO_MOD);
}

#[fixture]
fn check_world() -> CheckWorld {
    CheckWorld::default()
}

fn seed_submission(check_world: &CheckWorld) {
    let root = check_world.submitted_path();
    write_package(&root);
    write(&root, "llcppg.cfg", "{}");
}

#[given("a submitted package tree")]
fn given_submitted_tree(check_world: &CheckWorld) {
    seed_submission(check_world);
}

#[given("a submitted package tree with a README and extra.go")]
fn given_submitted_tree_with_extras(check_world: &CheckWorld) {
    seed_submission(check_world);
    let root = check_world.submitted_path();
    write(&root, "README.md", "# foo\n");
    write(&root, "extra.go", "package foo\n");
}

#[given("a generated tree with the same files")]
fn given_generated_same(check_world: &CheckWorld) {
    write_package(&check_world.generated_path());
}

#[given("a generated tree where foo.go differs")]
fn given_generated_changed(check_world: &CheckWorld) {
    let root = check_world.generated_path();
    write_package(&root);
    write(&root, "foo.go", "package foo\n\nfunc Foo() int { return 1 }\n");
}

#[given("a generated tree with an extra file baz.go")]
fn given_generated_extra(check_world: &CheckWorld) {
    let root = check_world.generated_path();
    write_package(&root);
    write(&root, "baz.go", "package foo\n");
}

#[given("a package directory without llcppg.cfg")]
fn given_no_config(check_world: &CheckWorld) {
    write(&check_world.submitted_path(), "llpkg.cfg", "{}");
}

#[when("the trees are checked")]
fn when_checked(check_world: &CheckWorld) {
    let context = check_world.context();
    let settings = GeneratorSettings::default();
    let executor = ScriptedExecutor::new(|_: &Invocation| {
        Err(io::Error::new(io::ErrorKind::NotFound, "git not installed"))
    });
    let generator = LlcppgGenerator::new(&context, &settings, &executor);

    let outcome = generator.check(&check_world.generated_path());
    check_world.outcome.replace(Some(outcome));
}

#[when("the package is generated")]
fn when_generated(check_world: &CheckWorld) {
    let context = check_world.context();
    let settings = GeneratorSettings::default();
    let executor = StubExecutor::new(Vec::new());
    let generator = LlcppgGenerator::new(&context, &settings, &executor);

    let result = generator.generate(&check_world.generated_path());
    check_world.generate_result.replace(Some(result));
    check_world.invocations.set(executor.invocations().len());
}

#[then("the outcome is equal")]
fn then_equal(check_world: &CheckWorld) {
    let outcome = check_world.outcome.borrow();
    let outcome = outcome.as_ref().expect("trees not checked");
    assert!(
        matches!(outcome, Ok(VerificationOutcome::Equal)),
        "expected equal trees, got {outcome:?}"
    );
}

#[then("foo.go is reported as not equal with a diff")]
fn then_foo_mismatch(check_world: &CheckWorld) {
    let violations = check_world.violations();
    assert_eq!(violations.mismatched.len(), 1);
    assert_eq!(violations.mismatched[0].path, "foo.go");
    assert!(!violations.mismatched[0].diff.is_empty());
    assert!(violations.missing.is_empty());
    assert!(violations.unexpected.is_empty());
    assert!(violations.to_string().contains("file not equal: foo.go"));
}

#[then("baz.go is reported as missing")]
fn then_baz_missing(check_world: &CheckWorld) {
    let violations = check_world.violations();
    assert_eq!(violations.missing, vec!["baz.go".to_owned()]);
    assert!(violations.mismatched.is_empty());
    assert!(violations.unexpected.is_empty());
}

#[then("README.md is not reported")]
fn then_readme_ignored(check_world: &CheckWorld) {
    let report = check_world.violations().to_string();
    assert!(!report.contains("README.md"));
}

#[then("extra.go is reported as unexpected")]
fn then_extra_unexpected(check_world: &CheckWorld) {
    let violations = check_world.violations();
    assert_eq!(violations.unexpected, vec!["extra.go".to_owned()]);
    assert!(violations.missing.is_empty());
}

#[then("generation fails with a cannot generate error")]
fn then_cannot_generate(check_world: &CheckWorld) {
    let result = check_world.generate_result.borrow();
    let result = result.as_ref().expect("package not generated");
    let Err(err) = result else {
        panic!("expected generation to fail");
    };
    assert_eq!(err.stage(), Stage::Generate);
    assert!(err.to_string().starts_with("llcppg: cannot generate"));
}

#[then("llcppg is never started")]
fn then_llcppg_not_started(check_world: &CheckWorld) {
    assert_eq!(check_world.invocations.get(), 0);
}

#[scenario(path = "tests/features/check.feature", index = 0)]
fn scenario_identical_trees(check_world: CheckWorld) {
    let _ = check_world;
}

#[scenario(path = "tests/features/check.feature", index = 1)]
fn scenario_changed_file(check_world: CheckWorld) {
    let _ = check_world;
}

#[scenario(path = "tests/features/check.feature", index = 2)]
fn scenario_missing_file(check_world: CheckWorld) {
    let _ = check_world;
}

#[scenario(path = "tests/features/check.feature", index = 3)]
fn scenario_non_hashable_ignored(check_world: CheckWorld) {
    let _ = check_world;
}

#[scenario(path = "tests/features/check.feature", index = 4)]
fn scenario_missing_config(check_world: CheckWorld) {
    let _ = check_world;
}
