//! Concurrency Integration Tests
//!
//! Programs own all of their state, so independent programs can run on
//! independent threads.

use snapscript::{Operand, ScriptProgram, ScriptSource, SharedOutput};
use std::thread;

const COUNTER: &str = r#"
void Init() { storeString("owner", OWNER); storeInt("count", 0); }
void Tick() { storeInt("count", getInt("count") + 1); }
string Owner() { return getString("owner"); }
"#;

fn counter_program(owner: &str) -> ScriptProgram {
    let constants = format!("const {{ string OWNER = \"{}\"; }}", owner);
    let mut program = ScriptProgram::new(vec![
        ScriptSource::new("constants", constants),
        ScriptSource::new("counter", COUNTER),
    ]);
    program.set_output(SharedOutput::new());
    program
}

/// Two programs on two threads never see each other's variables
#[test]
fn test_programs_on_separate_threads() {
    let handles: Vec<_> = [("left", 500), ("right", 700)]
        .into_iter()
        .map(|(owner, ticks)| {
            let mut program = counter_program(owner);
            thread::spawn(move || {
                assert!(program.compile());
                program.init_runtime(false).unwrap();
                let init = program.find_function("Init").unwrap();
                let tick = program.find_function("Tick").unwrap();
                let who = program.find_function("Owner").unwrap();
                program.invoke(&init, &[]).unwrap();
                for _ in 0..ticks {
                    program.invoke(&tick, &[]).unwrap();
                }
                let name = program.invoke(&who, &[]).unwrap();
                (name, program.var_store().get_int("count").unwrap(), program.var_store().len())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results[0], (Operand::from("left"), 500, 2));
    assert_eq!(results[1], (Operand::from("right"), 700, 2));
}

/// A program compiled on one thread can be moved to another and run there
#[test]
fn test_program_moves_between_threads() {
    let mut program = counter_program("mover");
    assert!(program.compile());
    program.init_runtime(false).unwrap();
    let init = program.find_function("Init").unwrap();

    let program = thread::spawn(move || {
        program.invoke(&init, &[]).unwrap();
        program
    })
    .join()
    .unwrap();

    assert_eq!(program.var_store().get_string("owner").unwrap(), "mover");
}
