use raylib::prelude::*;
use rand::Rng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wadcaster::config::RenderConfig;
use wadcaster::core::camera::Camera;
use wadcaster::core::entity::{Entity, EntityKind, EntityRegistry};
use wadcaster::core::input::process_events;
use wadcaster::core::map::{MapModel, OccupancyGrid, SegmentMap};
use wadcaster::error::LevelError;
use wadcaster::render::compositor::compose;
use wadcaster::render::framebuffer::Framebuffer;
use wadcaster::render::textures::TextureManager;
use wadcaster::wad::WadFile;

/// `wadcaster [map.txt]` or `wadcaster --wad <file.wad> <MAPNAME>`.
fn load_map(config: &RenderConfig) -> Result<MapModel, LevelError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [flag, wad_path, map_name] if flag == "--wad" => {
            let wad = WadFile::open(wad_path)?;
            let geometry = wad.load_level(map_name)?;
            Ok(MapModel::Segments(SegmentMap::from_geometry(&geometry)))
        }
        [path] => Ok(MapModel::Grid(OccupancyGrid::from_file(path, config)?)),
        [] => Ok(MapModel::Grid(OccupancyGrid::from_file(
            "maze.txt", config,
        )?)),
        _ => {
            eprintln!("usage: wadcaster [map.txt] | wadcaster --wad <file.wad> <MAPNAME>");
            std::process::exit(2);
        }
    }
}

/// Scatters a few enemies and item pickups into open grid cells.
fn populate(registry: &mut EntityRegistry, map: &MapModel, config: &RenderConfig) {
    let MapModel::Grid(grid) = map else {
        return; // segment maps carry no occupancy info to scatter into
    };
    let mut rng = rand::thread_rng();
    let mut open: Vec<(usize, usize)> = Vec::new();
    for cy in 0..grid.height() {
        for cx in 0..grid.width() {
            if !grid.is_wall_at(cx as i64, cy as i64) {
                open.push((cx, cy));
            }
        }
    }
    if open.is_empty() {
        return;
    }
    let spawn = grid.spawn();
    let mut place = |half_size: f64, texture: char, kind: EntityKind| {
        for _ in 0..32 {
            let (cx, cy) = open[rng.gen_range(0..open.len())];
            let x = (cx as f64 + 0.5) * config.tile_size;
            let y = (cy as f64 + 0.5) * config.tile_size;
            if (x - spawn.0).hypot(y - spawn.1) < config.tile_size {
                continue; // not on top of the player
            }
            registry.spawn(Entity {
                x,
                y,
                half_size,
                texture,
                kind: kind.clone(),
            });
            return;
        }
    };
    for _ in 0..3 {
        place(
            20.0,
            'N',
            EntityKind::Enemy {
                health: 100,
                speed: 80.0,
            },
        );
    }
    for _ in 0..5 {
        place(12.0, 'o', EntityKind::Item { heal: 25 });
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RenderConfig::default();
    let map = match load_map(&config) {
        Ok(map) => map,
        Err(err) => {
            // A corrupt or missing level must halt startup, not render.
            error!(%err, "level load failed");
            std::process::exit(1);
        }
    };

    let mut camera = Camera::at_spawn(map.spawn(), config.fov_deg);
    let mut registry = EntityRegistry::new();
    populate(&mut registry, &map, &config);
    info!(
        entities = registry.len(),
        "level ready, spawning at ({:.0}, {:.0})", camera.x, camera.y
    );

    let (mut window, raylib_thread) = raylib::init()
        .size(config.screen_width as i32, config.screen_height as i32)
        .title("wadcaster")
        .build();

    let texman = TextureManager::new();
    let mut framebuffer = Framebuffer::new(config.screen_width, config.screen_height);
    let blank = Image::gen_image_color(
        config.screen_width as i32,
        config.screen_height as i32,
        Color::BLACK,
    );
    let mut screen_tex = window
        .load_texture_from_image(&raylib_thread, &blank)
        .expect("framebuffer texture");

    while !window.window_should_close() {
        process_events(&window, &mut camera, &map);

        let commands = compose(&config, &camera, &map, &registry.sprites(), &texman);
        framebuffer.clear();
        framebuffer.execute(&commands, &texman);
        framebuffer.upload_to_texture(&mut screen_tex);

        let fps_now = window.get_fps();
        let mut d = window.begin_drawing(&raylib_thread);
        d.clear_background(Color::BLACK);
        d.draw_texture(&screen_tex, 0, 0, Color::WHITE);
        d.draw_text(&format!("FPS: {fps_now}"), 10, 10, 20, Color::WHITE);
    }
}
