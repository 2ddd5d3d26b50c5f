use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use contactbook::{Contact, ContactStore, InMemoryContactStore, SearchParams};

const FIRST: [&str; 8] = [
    "Ethan", "Queenie", "Zoe", "Nancy", "Olivia", "Liam", "Mateo", "Priya",
];
const LAST: [&str; 8] = [
    "Johns", "Gordon", "Johnson", "Evans", "Martin", "Nguyen", "Okafor", "Silva",
];

fn store_with(n: usize) -> InMemoryContactStore {
    let store = InMemoryContactStore::new("bench");
    for i in 0..n {
        let name = format!("{} {}", FIRST[i % FIRST.len()], LAST[(i / FIRST.len()) % LAST.len()]);
        let contact = Contact::new(name).with_email(format!("user{i}@example.com"));
        store.create(contact).unwrap();
    }
    store
}

fn bench_prefix_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/name_word_prefix");
    for n in [1_000usize, 10_000, 100_000] {
        let store = store_with(n);
        let params = SearchParams::all().name_word_prefix("johns");
        group.bench_with_input(BenchmarkId::from_parameter(n), &params, |b, params| {
            b.iter(|| store.search(params, 0, 5).unwrap());
        });
    }
    group.finish();
}

fn bench_email_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/email");
    for n in [1_000usize, 10_000, 100_000] {
        let store = store_with(n);
        let params = SearchParams::all().email("USER42@example.com");
        group.bench_with_input(BenchmarkId::from_parameter(n), &params, |b, params| {
            b.iter(|| store.search(params, 0, 5).unwrap());
        });
    }
    group.finish();
}

fn bench_create(c: &mut Criterion) {
    c.bench_function("create", |b| {
        let store = InMemoryContactStore::new("bench");
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            store
                .create(Contact::new(format!("Bench Person{i}")).with_email("b@example.com"))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_prefix_search, bench_email_search, bench_create);
criterion_main!(benches);
