use std::env;
use std::process;

fn main() {
    let db_path: String = env::args().nth(1).unwrap_or_else(|| "example.dbc".to_string());

    let db = match dbc_tools::parse::from_file(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("Version: {}", db.version);
    println!(
        "Nodes: {:?}",
        db.bus_nodes.iter().map(|n| &n.name).collect::<Vec<_>>()
    );
    println!("Messages: {}", db.messages.len());
    for msg in db.messages.values() {
        println!(
            "Message Name: {}\nid = {}\ndlc = {}\nbyte_length = {}\ntransmitter = {}\n",
            msg.name,
            msg.id,
            msg.dlc,
            msg.length(),
            msg.transmitting_node.name
        );
        for sig in msg.signals.values() {
            println!(
                "\tSignal Name: {}\n\tstart_bit = {}\n\tbit_length = {}\n\tendianness = {:?}\n\tsign = {:?}\n\tfactor = {}\n\toffset = {}\n\tmin = {}\n\tmax = {}\n\tunit = {}\n",
                sig.name,
                sig.start_bit,
                sig.bit_length,
                sig.endianness,
                sig.sign,
                sig.factor,
                sig.offset,
                sig.min,
                sig.max,
                sig.unit,
            );

            if !sig.value_descriptions.is_empty() {
                println!("\tValue Table:");
                for (value, desc) in &sig.value_descriptions {
                    println!("\t  {} => {}", value, desc);
                }
            }
        }
        println!();
    }
}
