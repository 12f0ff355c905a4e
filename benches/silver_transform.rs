use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forecast_lake::{
    city_detail_frame, forecast_frame, silver_plan, ForecastRecord, RawCityDetail, DEFAULT_CITIES,
};
use polars::prelude::*;

fn bronze_forecasts(days: i64) -> DataFrame {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let records: Vec<ForecastRecord> = (0..days)
        .flat_map(|day| {
            DEFAULT_CITIES.iter().map(move |city| ForecastRecord {
                city: city.to_string(),
                date: start + Duration::days(day),
                min_temp: 50.0 + (day % 10) as f64,
                max_temp: 70.0 + (day % 15) as f64,
                unit: "F".to_string(),
                day_icon: 7,
                day_phrase: "Cloudy".to_string(),
                night_icon: 38,
                night_phrase: "Mostly cloudy".to_string(),
                extracted_at: "2024-01-01T12:00:00+00:00".to_string(),
            })
        })
        .collect();
    forecast_frame(&records).unwrap()
}

fn bronze_details(runs: usize) -> DataFrame {
    let records: Vec<_> = (0..runs)
        .flat_map(|_| {
            DEFAULT_CITIES
                .iter()
                .map(|city| RawCityDetail::default().flatten(city, "2024-01-01T12:00:00+00:00"))
        })
        .collect();
    city_detail_frame(&records).unwrap()
}

fn bench_silver(c: &mut Criterion) {
    let forecasts = bronze_forecasts(365);
    let details = bronze_details(365);

    c.bench_function("silver_plan", |b| {
        b.iter(|| {
            silver_plan(
                black_box(forecasts.clone().lazy()),
                Some(black_box(details.clone().lazy())),
            )
            .collect()
            .unwrap()
        })
    });
    c.bench_function("silver_plan_without_details", |b| {
        b.iter(|| {
            silver_plan(black_box(forecasts.clone().lazy()), None)
                .collect()
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_silver);
criterion_main!(benches);
