//! Command handler and dispatcher tests

use mmio_console::console::commands::{
    Command, CommandDescriptor, Dispatcher, Handler, Output, DEFAULT_COMMANDS, HELP_COMMAND,
    READ_WORD_COMMAND, WRITE_WORD_COMMAND,
};
use mmio_console::console::parser::ParsedCommand;
use mmio_console::{ConsoleError, MemoryAccess, ReplyBuffer};

/// Memory fake recording every access
#[derive(Default)]
struct FakeMemory {
    value: u32,
    reads: Vec<u32>,
    writes: Vec<(u32, u32)>,
}

impl FakeMemory {
    fn returning(value: u32) -> Self {
        Self { value, ..Self::default() }
    }

    fn accesses(&self) -> usize {
        self.reads.len() + self.writes.len()
    }
}

impl MemoryAccess for FakeMemory {
    fn read_word(&mut self, addr: u32) -> u32 {
        self.reads.push(addr);
        self.value
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        self.writes.push((addr, value));
    }
}

fn dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    for descriptor in DEFAULT_COMMANDS {
        dispatcher.register(*descriptor).unwrap();
    }
    dispatcher
}

fn run(line: &str, mem: &mut FakeMemory) -> (bool, String) {
    let mut reply = ReplyBuffer::new();
    let more = dispatcher().process(line.as_bytes(), &mut reply, mem);
    (more, reply.as_str().to_string())
}

#[test]
fn test_command_registry_has_all_commands() {
    let dispatcher = dispatcher();
    let names: Vec<_> = dispatcher.registry().names().collect();

    assert_eq!(names, ["help", "rd", "wr"]);
    assert_eq!(dispatcher.registry().find("rd").unwrap().param_count, 1);
    assert_eq!(dispatcher.registry().find("wr").unwrap().param_count, 2);
}

#[test]
fn test_read_zero_is_a_value() {
    let mut mem = FakeMemory::returning(0);

    let (more, reply) = run("rd 0x0", &mut mem);

    assert!(!more);
    assert_eq!(reply, "0");
    assert_eq!(mem.reads, [0u32]);
}

#[test]
fn test_read_invalid_address_is_a_diagnostic() {
    let mut mem = FakeMemory::returning(0);

    let (more, reply) = run("rd zz", &mut mem);

    assert!(!more);
    assert_ne!(reply, "0");
    assert_eq!(reply, ConsoleError::InvalidNumber.to_string());
    assert_eq!(mem.accesses(), 0);
}

#[test]
fn test_read_formats_unsigned_decimal() {
    let mut mem = FakeMemory::returning(0xCAFE_BABE);

    let (_, reply) = run("rd 4096", &mut mem);

    assert_eq!(reply, "3405691582");
    assert_eq!(mem.reads, [4096u32]);
}

#[test]
fn test_read_missing_address() {
    let mut mem = FakeMemory::default();

    let (_, reply) = run("rd", &mut mem);

    assert_eq!(reply, "E03: missing argument");
    assert_eq!(mem.accesses(), 0);
}

#[test]
fn test_read_with_tiny_reply_buffer_writes_nothing() {
    let mut mem = FakeMemory::returning(7);
    let mut reply = ReplyBuffer::with_capacity(4);

    let more = dispatcher().process(b"rd 0x10", &mut reply, &mut mem);

    assert!(!more);
    assert!(reply.is_empty());
    assert_eq!(mem.accesses(), 0);
    assert_eq!(
        dispatcher().execute(b"rd 0x10", &mut reply, &mut mem),
        Err(ConsoleError::BufferTooSmall)
    );
}

#[test]
fn test_read_value_wider_than_reply_is_not_truncated() {
    let mut mem = FakeMemory::returning(123_456);
    let mut reply = ReplyBuffer::with_capacity(5);

    dispatcher().process(b"rd 0", &mut reply, &mut mem);

    assert!(reply.is_empty());
    // The word was still read, and its value is lost
    assert_eq!(mem.reads, [0u32]);

    let mut mem = FakeMemory::returning(123_456);
    assert_eq!(
        dispatcher().execute(b"rd 0", &mut reply, &mut mem),
        Err(ConsoleError::BufferTooSmall)
    );
    assert_eq!(mem.reads, [0u32]);
}

#[test]
fn test_write_records_single_access() {
    let mut mem = FakeMemory::default();

    let (more, reply) = run("wr 0x1000 42", &mut mem);

    assert!(!more);
    assert_eq!(reply, "");
    assert_eq!(mem.writes, [(0x1000u32, 42u32)]);
    assert!(mem.reads.is_empty());
}

#[test]
fn test_write_zero_values() {
    let mut mem = FakeMemory::default();

    run("wr 0 0x0", &mut mem);

    assert_eq!(mem.writes, [(0u32, 0u32)]);
}

#[test]
fn test_write_bad_address_or_value() {
    for line in ["wr zz 1", "wr 1 zz", "wr 0x 1", "wr 1", "wr"] {
        let mut mem = FakeMemory::default();

        let (_, reply) = run(line, &mut mem);

        assert!(reply.starts_with('E'), "{:?} gave {:?}", line, reply);
        assert_eq!(mem.accesses(), 0, "{:?} touched memory", line);
    }
}

#[test]
fn test_write_value_out_of_range() {
    let mut mem = FakeMemory::default();

    let (_, reply) = run("wr 0x10 4294967296", &mut mem);

    assert_eq!(reply, "E04: out of range");
    assert!(mem.writes.is_empty());
}

#[test]
fn test_execute_unknown_command() {
    let mut mem = FakeMemory::default();

    let (more, reply) = run("foo 1 2", &mut mem);

    assert!(!more);
    assert_eq!(reply, "E01: unknown command");
    assert_eq!(mem.accesses(), 0);
}

#[test]
fn test_command_names_are_case_sensitive() {
    let mut mem = FakeMemory::default();

    let (_, reply) = run("RD 0", &mut mem);

    assert_eq!(reply, "E01: unknown command");
}

#[test]
fn test_empty_line_has_no_reply() {
    let mut mem = FakeMemory::default();

    let (more, reply) = run("  ", &mut mem);

    assert!(!more);
    assert_eq!(reply, "");
}

#[test]
fn test_invalid_utf8_line() {
    let mut mem = FakeMemory::default();
    let mut reply = ReplyBuffer::new();

    dispatcher().process(b"rd \xff", &mut reply, &mut mem);

    assert_eq!(reply.as_str(), "E06: invalid encoding");
    assert_eq!(mem.accesses(), 0);
}

#[test]
fn test_execute_help() {
    let mut mem = FakeMemory::default();

    let (more, reply) = run("help", &mut mem);

    assert!(!more);
    let lines: Vec<_> = reply.lines().collect();
    assert_eq!(
        lines,
        [HELP_COMMAND.help, READ_WORD_COMMAND.help, WRITE_WORD_COMMAND.help]
    );
}

#[test]
fn test_register_duplicate_name_fails() {
    let mut dispatcher = dispatcher();

    assert_eq!(
        dispatcher.register(READ_WORD_COMMAND),
        Err(ConsoleError::DuplicateCommand)
    );
    assert_eq!(
        dispatcher.register(HELP_COMMAND),
        Err(ConsoleError::DuplicateCommand)
    );
    assert_eq!(dispatcher.registry().len(), 3);
}

// --- Custom commands ---

struct Echo;

impl Command for Echo {
    fn execute(
        &self,
        cmd: &ParsedCommand<'_>,
        reply: &mut ReplyBuffer,
        _mem: &mut dyn MemoryAccess,
    ) -> Result<Output, ConsoleError> {
        reply.try_push_str(cmd.arg(0).unwrap_or(""))?;
        Ok(Output::Done)
    }
}

const NAMES: [&str; 16] = [
    "c00", "c01", "c02", "c03", "c04", "c05", "c06", "c07", "c08", "c09", "c10", "c11", "c12",
    "c13", "c14", "c15",
];

const HELPS: [&str; 16] = [
    "c00: first", "c01: second", "c02: third", "c03: fourth", "c04: fifth", "c05: sixth",
    "c06: seventh", "c07: eighth", "c08: ninth", "c09: tenth", "c10: eleventh",
    "c11: twelfth", "c12: thirteenth", "c13: fourteenth", "c14: fifteenth", "c15: sixteenth",
];

fn echo_descriptor(i: usize) -> CommandDescriptor {
    CommandDescriptor {
        name: NAMES[i],
        param_count: 1,
        help: HELPS[i],
        handler: Handler::Command(&Echo),
    }
}

#[test]
fn test_custom_command_dispatch() {
    let mut dispatcher = dispatcher();
    dispatcher.register(echo_descriptor(0)).unwrap();
    let mut mem = FakeMemory::default();
    let mut reply = ReplyBuffer::new();

    dispatcher.process(b"c00 hello", &mut reply, &mut mem);

    assert_eq!(reply.as_str(), "hello");
}

#[test]
fn test_register_fails_when_full() {
    let mut dispatcher = Dispatcher::new();
    let mut results = Vec::new();
    for i in 0..NAMES.len() {
        results.push(dispatcher.register(echo_descriptor(i)));
    }

    // help occupies the first slot
    assert!(results[..15].iter().all(|r| r.is_ok()));
    assert_eq!(results[15], Err(ConsoleError::RegistryFull));
    assert_eq!(dispatcher.registry().len(), 16);
}

#[test]
fn test_help_multi_part_reply_is_complete() {
    let mut dispatcher = dispatcher();
    for i in 0..13 {
        dispatcher.register(echo_descriptor(i)).unwrap();
    }
    let mut mem = FakeMemory::default();
    let mut reply = ReplyBuffer::with_capacity(80);

    let mut chunks = Vec::new();
    loop {
        reply.clear();
        let more = dispatcher.process(b"help", &mut reply, &mut mem);
        chunks.push(reply.as_str().to_string());
        if !more {
            break;
        }
        assert!(chunks.len() < 32, "help never finished");
    }

    assert!(chunks.len() > 1, "registry should not fit in one chunk");
    assert!(chunks.iter().all(|c| c.len() <= 80));

    let listed: Vec<String> = chunks
        .iter()
        .flat_map(|c| c.lines().map(str::to_string))
        .collect();
    let expected: Vec<String> = dispatcher
        .registry()
        .commands()
        .iter()
        .map(|c| c.help.to_string())
        .collect();
    assert_eq!(listed, expected);

    // Enumeration restarts from the top afterwards
    reply.clear();
    dispatcher.process(b"help", &mut reply, &mut mem);
    assert!(reply.as_str().starts_with(HELP_COMMAND.help));
}
