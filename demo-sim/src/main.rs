use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Quat, Vec2, Vec3};
use replication::{
    ControlScheme, LoopbackHub, LoopbackTransport, PeerId, PeerRole, SyncConfig, Synchronizer,
};
use schema::BodyShape;
use serde::Serialize;
use world::SimWorld;

const DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(
    name = "demo-sim",
    version,
    about = "Deterministic server-plus-clients loopback run"
)]
struct Cli {
    /// Number of connected clients.
    #[arg(long, default_value_t = 2)]
    clients: u32,
    /// Number of replicated entities the server creates.
    #[arg(long, default_value_t = 8)]
    entities: u32,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 300)]
    ticks: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Optional path for the JSON summary (stdout otherwise).
    #[arg(long)]
    out: Option<PathBuf>,
}

struct Peer {
    world: SimWorld,
    net: LoopbackTransport,
    sync: Synchronizer,
}

impl Peer {
    fn attach(
        hub: &std::rc::Rc<std::cell::RefCell<LoopbackHub>>,
        id: PeerId,
        role: PeerRole,
    ) -> Self {
        let net = LoopbackTransport::attach(hub, id, role);
        let sync = Synchronizer::new(&net, SyncConfig::default());
        Self {
            world: SimWorld::new(),
            net,
            sync,
        }
    }

    fn tick(&mut self) {
        self.sync.tick(DT, &mut self.world, &mut self.net);
    }

    fn step_physics(&mut self) {
        self.sync.on_before_physics_step();
        self.world.step(DT);
        self.sync.on_after_physics_step(&self.world, &mut self.net);
    }
}

#[derive(Serialize)]
struct Summary {
    clients: u32,
    entities: u32,
    ticks: u32,
    seed: u64,
    layout_hash: String,
    server_entities: usize,
    server_history_len: usize,
    server_remote_intents: usize,
    client_entities: Vec<usize>,
    client_remote_intents: Vec<usize>,
    converged: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let hub = LoopbackHub::new();
    let mut server = Peer::attach(&hub, PeerId::SERVER, PeerRole::Server);
    let mut clients: Vec<Peer> = (1..=cli.clients)
        .map(|index| Peer::attach(&hub, PeerId::new(index), PeerRole::Client))
        .collect();

    for (index, client) in clients.iter_mut().enumerate() {
        client.sync.set_control_scheme(Some(ControlScheme {
            pointer_device: (index % 2) as u8,
            discrete_device: 2 + (index % 2) as u8,
        }));
    }

    // Drain the fresh-peer greetings while the world is still empty, so the
    // creation broadcasts below are the only copy each client sees.
    server.tick();

    let mut rng = Rng::new(cli.seed);
    spawn_entities(&mut server, cli.entities, &mut rng);

    for tick in 0..cli.ticks {
        for client in &mut clients {
            let wobble = Vec2::new(rng.unit() - 0.5, rng.unit() - 0.5);
            client.sync.set_control_intent(wobble, (tick % 16) as u16);
            client.tick();
        }
        server.tick();
        server.step_physics();
    }
    // One final drain so the last broadcasts land.
    for client in &mut clients {
        client.tick();
    }

    let converged = clients
        .iter()
        .all(|client| client.world.entity_count() == server.world.entity_count());
    let summary = Summary {
        clients: cli.clients,
        entities: cli.entities,
        ticks: cli.ticks,
        seed: cli.seed,
        layout_hash: format!("{:016x}", schema::layout_hash()),
        server_entities: server.world.entity_count(),
        server_history_len: server.sync.history().len(),
        server_remote_intents: server.sync.remote_intents().len(),
        client_entities: clients
            .iter()
            .map(|client| client.world.entity_count())
            .collect(),
        client_remote_intents: clients
            .iter()
            .map(|client| client.sync.remote_intents().len())
            .collect(),
        converged,
    };
    let rendered = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    match &cli.out {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("write {}", path.display()))?;
        }
        None => println!("{rendered}"),
    }
    anyhow::ensure!(converged, "clients diverged from the server's entity set");
    Ok(())
}

fn spawn_entities(server: &mut Peer, count: u32, rng: &mut Rng) {
    for index in 0..count {
        assert!(server.sync.open_request(&mut server.world));
        let position = Vec3::new(rng.unit() * 40.0 - 20.0, 2.0, rng.unit() * 40.0 - 20.0);
        server
            .sync
            .request_placement(&mut server.world, position, Quat::IDENTITY);
        let shape = match index % 4 {
            0 => BodyShape::Sphere { radius: 0.5 },
            1 => BodyShape::ConvexMesh {
                mesh: "crate_hull".to_owned(),
            },
            2 => BodyShape::Wheel {
                radius: 0.35,
                width: 0.25,
            },
            _ => BodyShape::Character {
                height: 1.8,
                radius: 0.4,
            },
        };
        server
            .sync
            .request_rigid_body(&mut server.world, shape, 1.0 + rng.unit() * 9.0, true);
        server
            .sync
            .request_renderable(&mut server.world, "demo_mesh", "demo_texture");
        let id = server.sync.close_request(&mut server.world, &mut server.net);
        if let Some(body) = server.world.body_mut(id) {
            body.linear_velocity = Vec3::new(rng.unit() - 0.5, 0.0, rng.unit() - 0.5) * 4.0;
        }
    }
}

/// Tiny deterministic xorshift; enough to vary a demo run by seed.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f32 {
        (self.next() >> 40) as f32 / (1u64 << 24) as f32
    }
}
