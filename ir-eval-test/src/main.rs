use std::path::{Path, PathBuf};

use anyhow::Context;
use ir_eval::{BitVector, Config, Evaluator, OperatorId};
use ir_ops::NumericFormatter;

use crate::tester::Tester;

mod parser;
mod tester;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("IR_EVAL_LOG"))
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

enum TestMode {
    All,
    Path(PathBuf),
    Eval(String, String, String),
}

fn run() -> anyhow::Result<()> {
    let mode_str = std::env::args().nth(1);
    let mode = match mode_str.as_deref() {
        Some("all") | None => TestMode::All,
        Some("eval") => {
            let arg = |index: usize, name: &str| {
                std::env::args().nth(index).ok_or_else(|| anyhow::format_err!("Expected {name}"))
            };
            TestMode::Eval(arg(2, "operator")?, arg(3, "lhs")?, arg(4, "rhs")?)
        }
        Some(path) => TestMode::Path(path.into()),
    };

    let mut evaluator =
        Evaluator::new(Config { strict_widths: std::env::var("IR_EVAL_STRICT").is_ok() });

    match mode {
        TestMode::All => {
            let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases");
            run_all_and_print(&mut evaluator, &dir)
        }
        TestMode::Path(path) if path.is_dir() => run_all_and_print(&mut evaluator, &path),
        TestMode::Path(path) => {
            let errors = run_test_and_print(&mut evaluator, &path)?;
            anyhow::ensure!(errors == 0, "{errors} test(s) failed");
            Ok(())
        }
        TestMode::Eval(op, lhs, rhs) => eval_one(&mut evaluator, &op, &lhs, &rhs),
    }
}

fn eval_one<T: Tester>(tester: &mut T, op: &str, lhs: &str, rhs: &str) -> anyhow::Result<()> {
    let id: OperatorId = op.parse()?;
    let lhs = parser::parse_operand(lhs).context("parsing lhs")?;
    let rhs = parser::parse_operand(rhs).context("parsing rhs")?;

    let result = match (lhs.as_known(), rhs.as_known()) {
        (Some(a), Some(b)) => {
            let (value, width) = tester.run_concrete(id, a, b)?;
            Operand::Known { value, width }
        }
        _ => Operand::Bits(tester.run_partial(id, &lhs.to_bitvec(), &rhs.to_bitvec())?),
    };

    let desc = id.descriptor().ok_or_else(|| anyhow::format_err!("{id} has no descriptor"))?;
    println!("{} = {}", desc.display(lhs, rhs), result);
    Ok(())
}

fn run_all_and_print<T: Tester>(tester: &mut T, dir: &Path) -> anyhow::Result<()> {
    let mut paths = vec![];
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut errors = 0;
    for path in paths {
        errors += run_test_and_print(tester, &path)?;
    }
    anyhow::ensure!(errors == 0, "{errors} test(s) failed");
    Ok(())
}

fn run_test_and_print<T: Tester>(tester: &mut T, path: &Path) -> anyhow::Result<usize> {
    let (count, skip, errors) = run_test(tester, path)?;
    eprintln!("{}: {} tests, {} skipped, {} errors", path.display(), count, skip, errors.len());
    for error in &errors {
        eprintln!("\t{}", error);
    }
    Ok(errors.len())
}

fn run_test<T: Tester>(tester: &mut T, path: &Path) -> anyhow::Result<(usize, usize, Vec<String>)> {
    let mut errors = vec![];

    let input = std::fs::read_to_string(path)
        .with_context(|| anyhow::format_err!("Failed to load: {}", path.display()))?;

    let mut parser = parser::Parser::new(&input);
    let mut count = 0;
    let mut skip = 0;
    loop {
        let test_case = match parser.parse_next() {
            Some(Ok(test)) => test,
            Some(Err(e)) => return Err(e.context(format!("Error parsing: {}", path.display()))),
            None => break,
        };
        count += 1;
        let display_prefix = format!("{}:{}", path.display(), test_case.start_line);

        if test_case.skip {
            tracing::info!("skipping: {}", display_prefix);
            skip += 1;
            continue;
        }

        if let Err(e) = check_one(tester, &test_case) {
            errors.push(format!("[{}] {:?}", display_prefix, e));
        }
    }

    Ok((count, skip, errors))
}

#[derive(Debug)]
pub struct TestCase {
    start_line: usize,
    op: OperatorId,
    lhs: Operand,
    rhs: Operand,
    expected: Operand,
    skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// `_`, an operand the operator does not read.
    Unused,

    /// `0xff:8`
    Known { value: u64, width: u8 },

    /// `0b1x0x`
    Bits(BitVector),
}

impl Operand {
    /// Returns the operand as a `(value, width)` pair if every bit is known.
    fn as_known(&self) -> Option<(u64, u8)> {
        match *self {
            Operand::Unused => Some((0, 0)),
            Operand::Known { value, width } => Some((value, width)),
            Operand::Bits(bits) => bits.get_const().map(|x| (x, bits.width())),
        }
    }

    fn to_bitvec(&self) -> BitVector {
        match *self {
            Operand::Unused => BitVector::zero(1),
            Operand::Known { value, width } => BitVector::known(value, width),
            Operand::Bits(bits) => bits,
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Operand::Unused => f.write_str("_"),
            Operand::Known { value, width } => {
                write!(f, "{}", NumericFormatter { value, is_signed: false, num_bits: width })
            }
            Operand::Bits(bits) => write!(f, "0b{}", bits.display()),
        }
    }
}

fn check_one<T: Tester>(tester: &mut T, test: &TestCase) -> anyhow::Result<()> {
    tracing::debug!("Running test: {:?}", test);
    let expected = test.expected.to_bitvec();

    if let (Some(lhs), Some(rhs)) = (test.lhs.as_known(), test.rhs.as_known()) {
        let (value, width) = tester.run_concrete(test.op, lhs, rhs)?;
        anyhow::ensure!(
            BitVector::known(value, width) == expected,
            "evaluate: expected: {} (got {})",
            test.expected,
            Operand::Known { value, width }
        );
    }

    let result = tester.run_partial(test.op, &test.lhs.to_bitvec(), &test.rhs.to_bitvec())?;
    anyhow::ensure!(
        result == expected,
        "evaluate_partial: expected: {} (got {})",
        test.expected,
        Operand::Bits(result)
    );

    Ok(())
}

#[test]
fn bundled_cases() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases");
    run_all_and_print(&mut Evaluator::default(), &dir).unwrap();
}
