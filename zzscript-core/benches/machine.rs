use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zzscript_core::{Board, Script};

const GUARD_SCRIPT: &'static str = "' patrolling guard
:start
Set 0 steps
:walk
Give 1 steps
#move north
If steps >= 4 turn
Send walk
:turn
#move south
Take 1 steps done
Send turn
:done
Restart
:touch
Lock
Say \"halt!\"
Wait 3
Unlock
Send start
";

criterion_group!(machine, compile, step, step_with_messages);
criterion_main!(machine);

fn compile(c: &mut Criterion) {
    c.bench_function("compile_guard", |b| {
        b.iter(|| black_box(Script::compile("guard", GUARD_SCRIPT).unwrap()))
    });
}

fn step(c: &mut Criterion) {
    let mut board = Board::default();
    let script = board.compile("guard", GUARD_SCRIPT).unwrap();
    for n in 0..100 {
        board
            .spawn(&format!("guard_{}", n), Some(script.clone()))
            .unwrap();
    }
    c.bench_function("step_100", |b| b.iter(|| black_box(board.step().unwrap())));
}

fn step_with_messages(c: &mut Criterion) {
    let mut board = Board::default();
    let script = board.compile("guard", GUARD_SCRIPT).unwrap();
    for n in 0..100 {
        board
            .spawn(&format!("guard_{}", n), Some(script.clone()))
            .unwrap();
    }
    c.bench_function("broadcast_step_100", |b| {
        b.iter(|| {
            board.broadcast("touch");
            black_box(board.step().unwrap())
        })
    });
}
