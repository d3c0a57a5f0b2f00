//! Assemble a small document in memory, compile it, and print scene
//! statistics.

use brickforge::{
    BuildConfig, Document, FileLine, Model, ModelKind, Palette, Point3, Quad, SubModelRef,
    Transform, CODE_MAIN,
};
use brickforge_doc::{ActionAttrs, BfcCert, BfcHint};

fn plate_top(size: f32) -> FileLine {
    FileLine::Quad(Quad {
        points: [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(size, 0.0, 0.0),
            Point3::new(size, 0.0, size),
            Point3::new(0.0, 0.0, size),
        ],
        color: CODE_MAIN,
        ccw: true,
        bfc: BfcHint::default(),
        attrs: ActionAttrs::default(),
    })
}

fn main() {
    env_logger::init();

    let mut doc = Document::new(Palette::standard());

    // A 2x2 plate: a quad top with four studs, each stud a primitive.
    doc.add_model(Model::certified(
        "stud.dat",
        ModelKind::Part,
        BfcCert::CertifiedOn,
    ));
    let mut plate = Model::certified("plate2x2.dat", ModelKind::Part, BfcCert::CertifiedOn);
    plate.push(plate_top(40.0));
    for x in 0..2 {
        for z in 0..2 {
            plate.push(FileLine::SubModel(SubModelRef::new(
                "stud.dat",
                Transform::translation(10.0 + 20.0 * x as f32, 0.0, 10.0 + 20.0 * z as f32),
            )));
        }
    }
    doc.add_model(plate);

    let mut root = Model::certified("tower.ldr", ModelKind::Assembly, BfcCert::CertifiedOn);
    for level in 0..4 {
        root.push(FileLine::SubModel(SubModelRef::colored(
            "plate2x2.dat",
            Transform::translation(0.0, -8.0 * level as f32, 0.0),
            (level % 16) as u32,
        )));
    }
    doc.add_model(root);

    let mut compiler = brickforge::Compiler::new(&doc, BuildConfig::default());
    compiler.on_progress(|fraction| {
        log::info!("compiling: {:3.0}%", fraction * 100.0);
        true
    });
    let graph = compiler.compile("tower.ldr").expect("build failed");

    println!("scene nodes:       {}", graph.node_count());
    println!("root instances:    {}", graph.root_node().instances.len());
    println!("unshared overlays: {}", graph.unregistered_count());
    for (_, node) in graph.iter() {
        println!(
            "  {:14} part={} shapes={} instances={}",
            node.name,
            node.part,
            node.shape_count(),
            node.instances.len()
        );
    }
}
