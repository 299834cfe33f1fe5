use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lispy::lexer::tokenize;
use lispy::parser::parse_program;

const BENCH_INPUT: &str = r#"
(set! fib (lambda (n)
  (if (< n 2)
      n
      (+ (fib (- n 1))
         (fib (- n 2))))))

(set! fact (lambda (n)
  (if (<= n 1)
      1
      (* n (fact (- n 1))))))

(set! count (lambda (item lst)
  (if (null? lst)
      0
      (+ (if (equal? item (car lst)) 1 0)
         (count item (cdr lst))))))

(fib 10)
(fact 5)
(count (quote the) (quote (the more the merrier the bigger the better)))
(list 123 45.67 -10 1e3 (quote (a (b (c)))) pi (sqrt 2))
(begin (set! r 10) (* pi (* r r)))
"#;

fn bench_reader(c: &mut Criterion) {
    let input = BENCH_INPUT.repeat(8);
    let mut group = c.benchmark_group("Reader");

    group.bench_with_input(BenchmarkId::new("tokenize", "program"), &input, |b, input| {
        b.iter(|| tokenize(black_box(input)))
    });
    group.bench_with_input(
        BenchmarkId::new("parse_program", "program"),
        &input,
        |b, input| b.iter(|| parse_program(black_box(input))),
    );

    group.finish();
}

criterion_group!(benches, bench_reader);
criterion_main!(benches);
