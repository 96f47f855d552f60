use criterion::{black_box, criterion_group, criterion_main, Criterion};

use retromol::{BondOrder, Molecule};

fn build_hexane() -> Molecule {
    let mut mol = Molecule::new();
    for i in 1..=6u16 {
        mol.new_atom_builder().new("C", i).unwrap().build().unwrap();
    }
    for i in 1..=5u16 {
        mol.new_bond_builder()
            .new(i)
            .unwrap()
            .atoms(i, i + 1)
            .unwrap()
            .order(BondOrder::Single)
            .build()
            .unwrap();
    }
    mol
}

fn build_naphthalene() -> Molecule {
    let mut mol = Molecule::new();
    for i in 1..=10u16 {
        mol.new_atom_builder().new("C", i).unwrap().build().unwrap();
    }
    let bonds = [
        (1u16, 2u16, BondOrder::Double),
        (2, 3, BondOrder::Single),
        (3, 4, BondOrder::Double),
        (4, 5, BondOrder::Single),
        (5, 6, BondOrder::Double),
        (6, 1, BondOrder::Single),
        (6, 7, BondOrder::Single),
        (7, 8, BondOrder::Double),
        (8, 9, BondOrder::Single),
        (9, 10, BondOrder::Double),
        (10, 1, BondOrder::Single),
    ];
    for (i, &(a1, a2, order)) in bonds.iter().enumerate() {
        mol.new_bond_builder()
            .new(i as u16 + 1)
            .unwrap()
            .atoms(a1, a2)
            .unwrap()
            .order(order)
            .build()
            .unwrap();
    }
    mol
}

fn build_steroid_skeleton() -> Molecule {
    // Four fused saturated rings, gonane-like.
    let mut mol = Molecule::new();
    for i in 1..=17u16 {
        mol.new_atom_builder().new("C", i).unwrap().build().unwrap();
    }
    let bonds: &[(u16, u16)] = &[
        (1, 2),
        (2, 3),
        (3, 4),
        (4, 5),
        (5, 6),
        (6, 1),
        (5, 7),
        (7, 8),
        (8, 9),
        (9, 10),
        (10, 6),
        (9, 11),
        (11, 12),
        (12, 13),
        (13, 14),
        (14, 10),
        (13, 15),
        (15, 16),
        (16, 17),
        (17, 14),
    ];
    for (i, &(a1, a2)) in bonds.iter().enumerate() {
        mol.new_bond_builder()
            .new(i as u16 + 1)
            .unwrap()
            .atoms(a1, a2)
            .unwrap()
            .order(BondOrder::Single)
            .build()
            .unwrap();
    }
    mol
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("finalize");

    group.bench_function("hexane", |b| {
        b.iter(|| {
            let mut mol = black_box(build_hexane());
            mol.finalize().unwrap();
            black_box(mol)
        })
    });
    group.bench_function("naphthalene", |b| {
        b.iter(|| {
            let mut mol = black_box(build_naphthalene());
            mol.finalize().unwrap();
            black_box(mol)
        })
    });
    group.bench_function("steroid_skeleton", |b| {
        b.iter(|| {
            let mut mol = black_box(build_steroid_skeleton());
            mol.finalize().unwrap();
            black_box(mol)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_finalize);
criterion_main!(benches);
