use rand::Rng;
use std::{path::PathBuf, time::Instant};
use tagstat::{
    to_csv, CancelToken, Database, Engine, Method, Reading, Tag, TagStore, Timestamp, Value,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const READINGS_PER_TAG: i64 = 100_000;

fn main() -> tagstat::Result<()> {
    env_logger::builder()
        .filter_module("lsm_tree", log::LevelFilter::Warn)
        .filter_module("fjall", log::LevelFilter::Info)
        .filter_module("tagstat", log::LevelFilter::Trace)
        .parse_default_env()
        .init();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(".tagstat"), PathBuf::from);

    if path.try_exists()? {
        std::fs::remove_dir_all(&path)?;
    }

    let db = Database::builder().cache_size_mib(128).open(&path)?;

    for tag in [
        Tag::new("temperature", "Temperature", "°C", "temp").decimal_precision(1),
        Tag::new("humidity", "Relative humidity", "%", "hum").decimal_precision(0),
    ] {
        db.create_tag(tag)?;
    }

    let engine = Engine::builder(db).cache(true).build();

    let start = Instant::now();

    {
        let mut rng = rand::thread_rng();

        for idx in 0..READINGS_PER_TAG {
            // Both sensors are sampled at the same device instant
            #[allow(clippy::cast_precision_loss)]
            let device_ts = 1_700_000_000.0 + idx as f64 * 0.5;

            // Temperature slowly rises, with some random variation
            #[allow(clippy::cast_precision_loss)]
            let temperature = 18.0 + idx as Value / 10_000.0 + rng.gen_range(-0.5..0.5);
            let humidity = (45.0_f64 + rng.gen_range(-5.0..5.0)).clamp(0.0, 100.0);

            engine.record(Reading::new(
                format!("t-{idx}"),
                "temperature",
                temperature,
                idx,
                device_ts,
                "sensor-1",
            ))?;
            engine.record(Reading::new(
                format!("h-{idx}"),
                "humidity",
                humidity,
                idx,
                device_ts,
                "sensor-1",
            ))?;

            if idx % 25_000 == 0 {
                log::info!("ingested {idx}");
            }
        }
    }

    log::info!("ingested in {:?}", start.elapsed());

    let window: (Timestamp, Timestamp) = (0, READINGS_PER_TAG - 1);

    for method in [Method::Average, Method::Median, Method::StandardDeviation] {
        let start = Instant::now();

        let series = engine.downsample_one("temperature", window.0, window.1, 10, method.code())?;

        log::info!("{method} done in {:?}", start.elapsed());
        log::info!(
            "{method}: {:?}",
            series.iter().map(|r| r.value).collect::<Vec<_>>()
        );
    }

    let start = Instant::now();

    let merged = engine.downsample_many(
        &["temperature", "humidity"],
        window.0,
        window.1,
        5,
        Method::Max.code(),
        &CancelToken::new(),
    )?;

    log::info!("merged in {:?}", start.elapsed());

    for sample in &merged {
        log::info!(
            "{}: {:?}",
            sample.measured_at_device,
            sample
                .tag_values
                .iter()
                .map(|(label, reading)| (label.as_str(), reading.value))
                .collect::<Vec<_>>()
        );
    }

    let series = engine.downsample_one("humidity", window.0, window.1, 5, Method::Mode.code())?;
    print!("{}", to_csv(&series));

    Ok(())
}
