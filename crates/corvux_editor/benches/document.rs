use corvux_editor::document::Document;
use corvux_editor::syntax::{find_ruleset, Tokenizer};
use corvux_editor::view::Cursor;
use divan::{bench, black_box, Bencher};

fn main() {
    divan::main();
}

const SOURCE: &str = "\tstatic int counter = 0; /* shared */ char *name = \"corvux\";";

#[bench(min_time = 0.25)]
fn insert_char(bencher: Bencher) {
    let mut document = Document::from_lines([SOURCE]);

    bencher.bench_local(|| {
        document.insert_char(Cursor::new(0, 10), 'x');
    });
}

#[bench]
fn insert_then_delete(bencher: Bencher) {
    let mut document = Document::from_lines([SOURCE]);

    bencher.bench_local(|| {
        document.insert_char(Cursor::new(0, 10), 'x');
        document.delete_char(Cursor::new(0, 11));
    });
}

#[bench]
fn split_and_join(bencher: Bencher) {
    let mut document = Document::from_lines([SOURCE]);

    bencher.bench_local(|| {
        document.split_row(Cursor::new(0, 20));
        document.delete_char(Cursor::new(1, 0));
    });
}

#[bench]
fn tokenize_line(bencher: Bencher) {
    let mut tokenizer = Tokenizer::new(find_ruleset("c"));

    bencher.bench_local(|| {
        tokenizer.set_input(black_box(SOURCE));
        tokenizer.by_ref().count()
    });
}
