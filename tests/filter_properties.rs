use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use compintel::filter::apply;
use compintel::{Destination, Engine, EngineConfig, RecordStore, Selection};

const SNAPSHOT: &str = include_str!("fixtures/dashboard.json");
const CASES: usize = 200;

const AGES: [&str; 5] = ["all", "6-10", "11-14", "15-18", "18+"];
const PROGRAMS: [&str; 5] = ["all", "summer", "study", "highschool", "school"];
const PRICES: [&str; 5] = ["all", "0-1000", "1000-2000", "2000-3000", "3000+"];

fn engine() -> Engine {
    Engine::from_json(SNAPSHOT, EngineConfig::default()).unwrap()
}

fn pick(rng: &mut SmallRng, menu: &[&'static str]) -> &'static str {
    menu.choose(rng).copied().unwrap()
}

fn random_selection(engine: &Engine, rng: &mut SmallRng) -> Selection {
    let mut sel = Selection::default();
    for c in engine.competitors().rivals() {
        if rng.gen_bool(0.5) {
            sel = engine.toggle_competitor(&sel, c.id.as_str()).unwrap();
        }
    }
    sel = engine.set_age_filter(&sel, pick(rng, &AGES)).unwrap();
    sel = engine.set_program_filter(&sel, pick(rng, &PROGRAMS)).unwrap();
    engine.set_price_filter(&sel, pick(rng, &PRICES)).unwrap()
}

fn positions(store: &RecordStore, kept: &[Destination]) -> Vec<usize> {
    kept.iter()
        .map(|d| store.destinations().iter().position(|s| s == d).unwrap())
        .collect()
}

#[test]
fn filtering_is_idempotent() {
    let engine = engine();
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..CASES {
        let sel = random_selection(&engine, &mut rng);
        assert_eq!(engine.apply_filters(&sel), engine.apply_filters(&sel));
    }
}

#[test]
fn destination_kept_iff_it_satisfies_every_facet() {
    let engine = engine();
    let store = engine.store();
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..CASES {
        let sel = random_selection(&engine, &mut rng);
        let visible = sel.visible_competitors(engine.competitors());

        let expected: Vec<Destination> = store
            .destinations()
            .iter()
            .filter(|d| sel.age().value().map_or(true, |age| *age == d.age_band))
            .filter(|d| sel.program().value().map_or(true, |p| *p == d.program))
            .filter(|d| sel.price().value().map_or(true, |band| band.contains(d.price)))
            .filter(|d| visible.contains(&d.competitor))
            .cloned()
            .collect();
        assert_eq!(apply(store, &sel).destinations, expected, "{sel:?}");
    }
}

#[test]
fn facets_compose_as_intersection() {
    let engine = engine();
    let store = engine.store();
    let mut rng = SmallRng::seed_from_u64(23);
    for _ in 0..CASES {
        let base = random_selection(&engine, &mut rng);
        let age = pick(&mut rng, &AGES);
        let program = pick(&mut rng, &PROGRAMS);
        let price = pick(&mut rng, &PRICES);

        let only = |a: &str, p: &str, b: &str| {
            let sel = engine.set_age_filter(&base, a).unwrap();
            let sel = engine.set_program_filter(&sel, p).unwrap();
            let sel = engine.set_price_filter(&sel, b).unwrap();
            apply(store, &sel).destinations
        };
        let by_age = only(age, "all", "all");
        let by_program = only("all", program, "all");
        let by_price = only("all", "all", price);
        let all_three = only(age, program, price);

        let expected: Vec<Destination> = by_age
            .iter()
            .filter(|d| by_program.contains(d) && by_price.contains(d))
            .cloned()
            .collect();
        assert_eq!(all_three, expected, "age={age} program={program} price={price}");
    }
}

#[test]
fn subsets_only_mention_visible_competitors() {
    let engine = engine();
    let store = engine.store();
    let mut rng = SmallRng::seed_from_u64(13);
    for _ in 0..CASES {
        let sel = random_selection(&engine, &mut rng);
        let out = apply(store, &sel);
        let visible = sel.visible_competitors(engine.competitors());
        assert_eq!(&visible[0], store.reference());

        assert!(out.destinations.iter().all(|d| visible.contains(&d.competitor)));
        assert!(out.nps.iter().all(|n| visible.contains(&n.competitor)));
        assert!(out
            .prices
            .iter()
            .all(|p| p.prices.keys().all(|k| visible.contains(k))));
        assert!(out
            .sentiment
            .iter()
            .all(|s| s.scores.keys().all(|k| visible.contains(k))));
        assert!(out
            .swot
            .iter()
            .all(|s| s.competitor.as_ref().map_or(true, |c| visible.contains(c))));
    }
}

#[test]
fn kept_records_preserve_store_order() {
    let engine = engine();
    let store = engine.store();
    let mut rng = SmallRng::seed_from_u64(17);
    for _ in 0..CASES {
        let sel = random_selection(&engine, &mut rng);
        let kept = positions(store, &apply(store, &sel).destinations);
        assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn toggling_twice_restores_the_selection() {
    let engine = engine();
    let mut rng = SmallRng::seed_from_u64(19);
    let ids: Vec<String> = engine
        .competitors()
        .iter()
        .map(|c| c.id.to_string())
        .collect();
    for _ in 0..CASES {
        let sel = random_selection(&engine, &mut rng);
        let id = ids.choose(&mut rng).unwrap();
        let once = engine.toggle_competitor(&sel, id).unwrap();
        let twice = engine.toggle_competitor(&once, id).unwrap();
        assert_eq!(twice, sel);
        assert_eq!(
            engine.apply_filters(&twice).fingerprint(),
            engine.apply_filters(&sel).fingerprint()
        );
    }
}

#[test]
fn price_band_boundary_goes_to_higher_band() {
    let engine = engine();
    let store = engine.store();
    let sel = engine.initial_selection();
    let sel = engine.toggle_competitor(&sel, "training").unwrap();
    let low = engine.set_price_filter(&sel, "0-1000").unwrap();
    let mid = engine.set_price_filter(&sel, "1000-2000").unwrap();

    let roma = |s: &Selection| {
        apply(store, s)
            .destinations
            .iter()
            .any(|d| d.name == "Roma (IT)")
    };
    assert!(!roma(&low));
    assert!(roma(&mid));
}
