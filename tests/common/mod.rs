#![allow(dead_code)]

use std::sync::Arc;

use seishaz::gmm::groundmotionmodel::Gmm;
use seishaz::model::gmmset::GmmSet;
use seishaz::model::hazardmodel::HazardModel;
use seishaz::model::location::Location;
use seishaz::model::mfd::Mfd;
use seishaz::model::site::Site;
use seishaz::model::source::Source;
use seishaz::model::sourceset::SourceSet;
use seishaz::model::sourcetype::SourceType;

pub fn site() -> Site {
    Site::builder(Location::new(-89.5, 36.5).unwrap()).name("memphis-ish").vs30(760.0).build().unwrap()
}

/// Gridded seismicity around the site plus one dipping fault, split over two
/// GMM logic trees.
pub fn model() -> Arc<HazardModel> {
    let origin = *site().location();
    let mfd = Mfd::gutenberg_richter(3.2, 1.0, 5.05, 7.35, 0.1).unwrap();
    let grid: Vec<Source> = (0..4)
        .flat_map(|i| (0..4).map(move |j| (i, j)))
        .map(|(i, j)| {
            let hypocenter = origin
                .offset_km(-60.0 + 40.0 * i as f64, -60.0 + 40.0 * j as f64)
                .with_depth(5.0)
                .unwrap();
            Source::point(format!("grid-{i}-{j}"), hypocenter, 0.0, &mfd).unwrap()
        })
        .collect();
    let fault = Source::fault(
        "reelfoot",
        origin.offset_km(15.0, -40.0),
        origin.offset_km(25.0, 40.0),
        45.0, 20.0, 0.0, 90.0,
        &Mfd::incremental(vec![7.0, 7.5], vec![1.5e-3, 5e-4]).unwrap()
    )
    .unwrap();

    let ceus = Arc::new(GmmSet::builder().gmm(Gmm::Toro97, 0.5).gmm(Gmm::Campbell03, 0.5).build().unwrap());
    let bjf = Arc::new(GmmSet::builder().gmm(Gmm::Bjf97, 1.0).uncertainty(0.2).build().unwrap());

    HazardModel::builder("integration")
        .source_set(SourceSet::builder("grid", SourceType::Grid).gmm_set(ceus).sources(grid).build().unwrap())
        .source_set(SourceSet::builder("faults", SourceType::Fault).gmm_set(bjf).weight(0.8).source(fault).build().unwrap())
        .build()
        .map(Arc::new)
        .unwrap()
}
