use criterion::{Criterion, criterion_group, criterion_main};
use foldcomp_rs::{FoldCompound, FoldOptions, ModelDetails};
use std::hint::black_box;

const SEQ: &[u8] = b"GAAAUAGACGCCAAGUUCAAUCCGUACUCCGACGUACGAUGGAACAGUGUGGAUGUGACGAGCUUCAUUUAUACCCUUCGCGCGCCGGACCGGGGUCCGCAAGGCGCGGCGGUGCACAAGCAAUUGACAACUAACCACCGUGUAUUCGUUAUGGCACCAGGGAGUUUAAGCCGAGUCAAUGGAGCUCGCAAUACAGAGUU".as_slice();

fn criterion_benchmark(c: &mut Criterion) {
    let md = ModelDetails::default();
    let options = FoldOptions::new().mfe().pf();

    c.bench_function("dense", |b| {
        b.iter(|| FoldCompound::new(black_box(SEQ), &md, options))
    });

    let open = vec![b'.'; SEQ.len()];
    let mut hairpin = open.clone();
    hairpin[..3].copy_from_slice(b"(((");
    hairpin[SEQ.len() - 3..].copy_from_slice(b")))");

    c.bench_function("two_reference", |b| {
        b.iter(|| FoldCompound::new_two_reference(black_box(SEQ), &hairpin, &open, &md, options))
    });

    let mut fc = FoldCompound::new(SEQ, &md, options);
    c.bench_function("rescale", |b| b.iter(|| fc.rescale(black_box(Some(-42.0)))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
