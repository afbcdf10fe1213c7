//! End-to-end scenarios over the deterministic kernel.

use synfire_entities::{Entity, Neuron};
use synfire_messages::{Message, SpikeContext};
use synfire_simulation::SimulationRunner;
use synfire_types::{
    AxonId, CoreId, EntityId, EntityKind, GenSelection, GeneratorConfig, GlobalIndex, LocalId,
    Mapping, SimConfig, SimTime,
};
use tracing_test::traced_test;

/// 1 core, 1 neuron, 1 axon, 1 synapse, thresholds [100, 1000].
fn single_core_config() -> SimConfig {
    SimConfig::new(1, 1, 1, 1)
        .with_grid(1, 1)
        .with_thresholds(100, 1000)
        .with_weights(-500, 500)
}

/// Positions of the first neuron and axon of core 0.
struct Layout {
    neuron: EntityId,
    neuron_index: GlobalIndex,
    axon: EntityId,
    axon_index: GlobalIndex,
}

fn core_zero_layout(mapping: &Mapping) -> Layout {
    let core = CoreId(0);
    let neuron_local = mapping
        .local_of_kind(EntityKind::Neuron, 0)
        .expect("a neuron is configured");
    let axon_local = mapping
        .local_of_kind(EntityKind::Axon, 0)
        .expect("an axon is configured");
    let neuron = EntityId::new(core, neuron_local);
    let axon = EntityId::new(core, axon_local);
    Layout {
        neuron,
        neuron_index: mapping.decode_from_core(neuron).expect("resolves"),
        axon,
        axon_index: mapping.decode_from_core(axon).expect("resolves"),
    }
}

fn input_spike() -> Message {
    Message::AxonOut(SpikeContext {
        rnd_call_count: 0,
        sender: LocalId(0),
        voltage: 0,
        last_active: SimTime::ZERO,
        last_leak: SimTime::ZERO,
        axon: AxonId(0),
    })
}

fn install_neuron(runner: &mut SimulationRunner, layout: &Layout, threshold: u32, weight: i32) {
    let neuron = Neuron::new(
        runner.config(),
        layout.neuron.local,
        threshold,
        vec![weight],
        vec![layout.axon],
    );
    runner
        .set_entity(layout.neuron_index, Entity::Neuron(neuron))
        .expect("neuron slot exists");
}

#[test]
fn single_subthreshold_spike_raises_voltage_without_firing() {
    let mut runner = SimulationRunner::new(single_core_config()).expect("valid config");
    let layout = core_zero_layout(runner.mapping());
    install_neuron(&mut runner, &layout, 1000, 150);

    runner
        .inject(layout.neuron, SimTime(0.1), input_spike())
        .expect("neuron resolvable");
    runner.run_until(SimTime(0.5)).expect("run");

    let neuron = runner
        .entity(layout.neuron_index)
        .and_then(Entity::as_neuron)
        .expect("neuron present");
    assert_eq!(neuron.voltage_at(runner.now()), 150);
    assert_eq!(runner.stats().neuron_out_sent, 0, "threshold not crossed");
}

#[test]
fn three_spikes_cross_threshold_and_fire_exactly_once() {
    let mut runner = SimulationRunner::new(single_core_config()).expect("valid config");
    let layout = core_zero_layout(runner.mapping());
    install_neuron(&mut runner, &layout, 1000, 400);

    for delay in [0.1, 0.2, 0.3] {
        runner
            .inject(layout.neuron, SimTime(delay), input_spike())
            .expect("neuron resolvable");
    }
    runner.run_until(SimTime(5.0)).expect("run");

    // 400 + 400 stays under 1000; the third spike reaches 1200 and
    // fires exactly one NeuronOut to the registered axon.
    assert_eq!(runner.stats().neuron_out_sent, 1);
    let axon = runner
        .entity(layout.axon_index)
        .and_then(Entity::as_axon)
        .expect("axon present");
    assert!(
        axon.last_active() > SimTime(0.3),
        "registered axon received the fire"
    );

    // The axon relays the fire back into the core: one more weighted
    // spike lands on the post-reset neuron and stays below threshold.
    let neuron = runner
        .entity(layout.neuron_index)
        .and_then(Entity::as_neuron)
        .expect("neuron present");
    assert_eq!(neuron.voltage_at(runner.now()), 400);
    assert_eq!(runner.stats().neuron_out_sent, 1, "no second crossing");
}

#[test]
fn clamp_events_are_observable_not_fatal() {
    let mut runner = SimulationRunner::new(single_core_config().with_thresholds(100, 600))
        .expect("valid config");
    let layout = core_zero_layout(runner.mapping());

    // Weight 900 exceeds the configured weight max of 500.
    install_neuron(&mut runner, &layout, 600, 900);

    runner
        .inject(layout.neuron, SimTime(0.1), input_spike())
        .expect("neuron resolvable");
    runner
        .run_until(SimTime(0.5))
        .expect("clamping never aborts the run");

    assert!(runner.clamp_events() >= 1, "clamp was counted");
}

#[test]
fn enabled_generator_synthesizes_load_end_to_end() {
    // 1 core: 1 axon, 1 neuron, 1 standalone generator, no synapses.
    let mut config = SimConfig::new(1, 1, 0, 1).with_grid(1, 1);
    config.generators_per_core = 1;
    config.generator = GeneratorConfig {
        enabled: true,
        probability: 1.0,
        outbound: 1,
        selection: GenSelection::RoundRobin,
        scale: 1.0,
    };

    let mut runner = SimulationRunner::new(config).expect("valid config");
    runner.run_until(SimTime(4.0)).expect("run");

    // The generator fires at each of ticks 1..=4. Each fire is one
    // SynapseOut into the axon plus one relayed AxonOut into the
    // neuron; the last hop or two may still be in flight at the
    // horizon.
    assert!(
        runner.stats().spikes_delivered >= 5,
        "expected generator-driven spikes, saw {}",
        runner.stats().spikes_delivered
    );
    assert!(runner.stats().heartbeats_delivered > 0);
}

#[traced_test]
#[test]
fn identical_configurations_replay_bit_identically() {
    let run = || {
        let mut runner =
            SimulationRunner::new(SimConfig::new(2, 2, 1, 2).with_grid(2, 1).with_seed(777))
                .expect("valid config");
        let layout = core_zero_layout(runner.mapping());
        runner
            .inject(layout.neuron, SimTime(0.25), input_spike())
            .expect("neuron resolvable");
        runner.run_until(SimTime(10.0)).expect("run");

        let voltages: Vec<i32> = (0..runner.mapping().total_entities())
            .filter_map(|i| runner.entity(GlobalIndex(i)))
            .filter_map(Entity::as_neuron)
            .map(|n| n.voltage_at(runner.now()))
            .collect();
        (runner.stats(), voltages)
    };

    assert_eq!(run(), run());
}
