use arch::symbol::{ARG, LCL, SP, STACK_BASE, THAT, THIS};
use hemu::State;
use vmt::{translate, Options, Source};

const MAX_STEPS: u64 = 1_000_000;

fn build(sources: &[Source], bootstrap: bool) -> String {
    let options = Options {
        bootstrap,
        ..Options::default()
    };
    let translated = translate(sources, &options);
    assert!(translated.is_ok(), "{:?}", translated.msgs.iter().map(|m| m.to_string()).collect::<Vec<_>>());
    let assembled = hasm::assemble("Prog.asm", &translated.asm);
    assert!(assembled.is_ok(), "{:?}", assembled.msgs.iter().map(|m| m.to_string()).collect::<Vec<_>>());
    assembled.to_text()
}

fn load(hack: &str) -> State {
    let mut state = State::new();
    state.load_text(hack).unwrap();
    state
}

/// Run a single bytecode file without bootstrap, with the stack at 256.
fn run_bare(vm: &str) -> State {
    let mut state = load(&build(&[Source::new("Main.vm", vm)], false));
    state.set(SP, STACK_BASE);
    state.run(MAX_STEPS);
    assert!(state.is_terminated());
    state
}

fn top(state: &State) -> i16 {
    state.get(state.get(SP) - 1) as i16
}

#[test]
fn add_leaves_sum_on_stack() {
    let state = run_bare("push constant 7\npush constant 8\nadd\n");
    assert_eq!(state.get(SP), STACK_BASE + 1);
    assert_eq!(top(&state), 15);
}

#[test]
fn comparisons() {
    macro_rules! case {
        ($vm:expr, $expected:expr) => {
            assert_eq!(top(&run_bare($vm)), $expected, "{}", $vm);
        };
    }
    case!("push constant 2\npush constant 3\neq\n", 0);
    case!("push constant 2\npush constant 2\neq\n", -1);
    case!("push constant 2\npush constant 3\nlt\n", -1);
    case!("push constant 2\npush constant 3\ngt\n", 0);
    case!("push constant 0\npush constant 5\nsub\npush constant 3\nlt\n", -1);
    case!("push constant 1\npush constant 2\nlt\npush constant 3\npush constant 2\nlt\nor\n", -1);
}

#[test]
fn arithmetic_and_logic() {
    let state = run_bare(
        "push constant 10\npush constant 3\nsub\nneg\npush constant 12\npush constant 10\nand\npush constant 1\nor\nnot\n",
    );
    assert_eq!(state.get(STACK_BASE) as i16, -7);
    assert_eq!(top(&state), !9);
    assert_eq!(state.get(SP), STACK_BASE + 2);
}

#[test]
fn segments() {
    let mut state = load(&build(
        &[Source::new(
            "Main.vm",
            "push constant 5\npop local 1\npush constant 6\npop that 2\npush constant 7\npop temp 3\n\
             push constant 8\npop static 0\npush local 1\npush that 2\nadd\npush temp 3\nadd\npush static 0\nadd\n\
             push constant 3000\npop pointer 0\npush constant 9\npop this 0\n",
        )],
        false,
    ));
    state.set(SP, STACK_BASE);
    state.set(LCL, 300);
    state.set(THAT, 3010);
    state.run(MAX_STEPS);
    assert_eq!(state.get(301), 5);
    assert_eq!(state.get(3012), 6);
    assert_eq!(state.get(8), 7);
    assert_eq!(state.get(16), 8);
    assert_eq!(state.get(STACK_BASE), 26);
    assert_eq!(state.get(THIS), 3000);
    assert_eq!(state.get(3000), 9);
}

#[test]
fn call_and_return_restore_frame() {
    let hack = build(
        &[
            Source::new("Main.vm", "push constant 11\ncall Foo.bar 0\nlabel END\ngoto END\n"),
            Source::new("Foo.vm", "function Foo.bar 2\npush constant 42\nreturn\n"),
        ],
        false,
    );
    let mut state = load(&hack);
    state.set(SP, STACK_BASE);
    state.set(LCL, 300);
    state.set(ARG, 400);
    state.set(THIS, 3000);
    state.set(THAT, 3010);
    // dirty the slots the callee's locals will occupy
    state.set(STACK_BASE + 6, 99);
    state.set(STACK_BASE + 7, 99);

    state.run(MAX_STEPS);
    assert!(state.is_terminated());

    // one word taller than before the call (SP was 257 after the first push)
    assert_eq!(state.get(SP), STACK_BASE + 2);
    assert_eq!(state.get(STACK_BASE), 11);
    assert_eq!(top(&state), 42);
    assert_eq!(state.get(LCL), 300);
    assert_eq!(state.get(ARG), 400);
    assert_eq!(state.get(THIS), 3000);
    assert_eq!(state.get(THAT), 3010);
    // locals were zeroed on entry
    assert_eq!(state.get(STACK_BASE + 6), 0);
    assert_eq!(state.get(STACK_BASE + 7), 0);
}

#[test]
fn call_with_arguments() {
    let hack = build(
        &[
            Source::new("Main.vm", "push constant 3\npush constant 4\ncall Foo.add 2\nlabel END\ngoto END\n"),
            Source::new("Foo.vm", "function Foo.add 0\npush argument 0\npush argument 1\nadd\nreturn\n"),
        ],
        false,
    );
    let mut state = load(&hack);
    state.set(SP, STACK_BASE);
    state.run(MAX_STEPS);
    assert_eq!(state.get(SP), STACK_BASE + 1);
    assert_eq!(top(&state), 7);
}

#[test]
fn bootstrap_runs_entry_with_loops() {
    let main = "function Main.mul 1
push constant 0
pop local 0
label LOOP
push argument 1
push constant 0
eq
if-goto DONE
push local 0
push argument 0
add
pop local 0
push argument 1
push constant 1
sub
pop argument 1
goto LOOP
label DONE
push local 0
return
";
    let sys = "function Sys.init 0
push constant 6
push constant 7
call Main.mul 2
pop static 0
push constant 0
return
";
    let hack = build(&[Source::new("Main.vm", main), Source::new("Sys.vm", sys)], true);
    let mut state = load(&hack);
    let steps = state.run(MAX_STEPS);
    assert!(steps < MAX_STEPS);
    assert!(state.is_terminated());
    assert_eq!(state.get(16), 42);
}

#[test]
fn user_labels_named_like_return_labels_assemble() {
    let sys = "function Sys.init 0
label ret.0
label EQ_TRUE
push constant 3
call Sys.double 1
push constant 6
eq
pop static 0
push constant 0
return
function Sys.double 0
push argument 0
push argument 0
add
return
";
    let mut state = load(&build(&[Source::new("Sys.vm", sys)], true));
    state.run(MAX_STEPS);
    assert!(state.is_terminated());
    assert_eq!(state.get(16), 0xFFFF);
}

const FIB: &str = "class Main {
    function int fib(int n) {
        if (n < 2) { return n; }
        return Main.fib(n - 1) + Main.fib(n - 2);
    }
}";

const SYS: &str = "class Sys {
    static int result;
    function void init() {
        var Counter c;
        let result = Main.fib(10);
        let c = 0;
        do Sys.count(5);
        return;
    }
    function void count(int n) {
        var int i;
        let i = 0;
        while (i < n) {
            let i = i + 1;
        }
        return;
    }
}";

fn jack_pipeline() -> String {
    let sources: Vec<Source> = [("Main.jack", FIB), ("Sys.jack", SYS)]
        .iter()
        .map(|(name, src)| {
            let compiled = jackc::compile(name, src).unwrap();
            assert!(compiled.is_ok(), "{:?}", compiled.msgs.iter().map(|m| m.to_string()).collect::<Vec<_>>());
            Source::new(name.replace(".jack", ".vm"), compiled.to_text())
        })
        .collect();
    build(&sources, true)
}

#[test]
fn jack_program_end_to_end() {
    let mut state = load(&jack_pipeline());
    state.run(MAX_STEPS);
    assert!(state.is_terminated());
    assert_eq!(state.get(16), 55);
}

#[test]
fn pipeline_is_deterministic() {
    assert_eq!(jack_pipeline(), jack_pipeline());
}
