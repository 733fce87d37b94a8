use criterion::{black_box, criterion_group, criterion_main, Criterion};
use modrouter::{
    InlineModule, Module, ModuleDependencies, ModuleMetadata, ModuleSet, NoopSink, Request,
    Response, Router,
};
use std::sync::Arc;

fn create_module_set(count: usize) -> ModuleSet {
    let mut modules: Vec<Arc<dyn Module>> = (0..count)
        .map(|i| {
            Arc::new(InlineModule::new(
                ModuleMetadata::new(format!("mod{}", i), &format!("/mod{}", i))
                    .with_dependencies(if i > 0 { vec![format!("mod{}", i - 1)] } else { vec![] }),
                |_, _| Ok(Some(Response::new(200).with_body(b"ok".to_vec()))),
            )) as Arc<dyn Module>
        })
        .collect();
    modules.push(Arc::new(InlineModule::declining(ModuleMetadata::new("root", "/"))));
    modules.into_iter().collect()
}

fn benchmark_dispatch_first_match(c: &mut Criterion) {
    let router = Router::new(create_module_set(50), Arc::new(NoopSink));

    c.bench_function("dispatch_first_match", |b| {
        b.iter(|| {
            let mut request = Request::new("GET", "/mod0/items");
            black_box(router.dispatch(black_box(&mut request)));
        })
    });
}

fn benchmark_dispatch_last_match(c: &mut Criterion) {
    let router = Router::new(create_module_set(50), Arc::new(NoopSink));

    c.bench_function("dispatch_last_match", |b| {
        b.iter(|| {
            let mut request = Request::new("GET", "/mod49/items");
            black_box(router.dispatch(black_box(&mut request)));
        })
    });
}

fn benchmark_dispatch_fallback(c: &mut Criterion) {
    let router = Router::new(create_module_set(50), Arc::new(NoopSink));

    c.bench_function("dispatch_fallback", |b| {
        b.iter(|| {
            let mut request = Request::new("GET", "/nowhere");
            black_box(router.dispatch(black_box(&mut request)));
        })
    });
}

fn benchmark_resolve_chain(c: &mut Criterion) {
    let modules = create_module_set(200);

    c.bench_function("resolve_dependency_chain", |b| {
        b.iter(|| {
            black_box(ModuleDependencies::resolve(black_box(&modules)));
        })
    });
}

criterion_group!(
    benches,
    benchmark_dispatch_first_match,
    benchmark_dispatch_last_match,
    benchmark_dispatch_fallback,
    benchmark_resolve_chain
);
criterion_main!(benches);
