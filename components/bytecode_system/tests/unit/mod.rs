//! Unit test harness for bytecode_system

mod test_program;
