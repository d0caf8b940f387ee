use reflex_json::{json_struct, Reader, Writer};

json_struct! {
    #[derive(Debug, Default)]
    pub struct Server {
        pub host: String,
        pub port: i64,
        pub secure: bool,
    }
}

fn main() {
    let json_data = r#"
        {
            "host": "api.example.com",
            "port": 8443,
            "secure": true
        }
    "#;

    let reader = Reader::from_text(json_data);
    let mut server = Server::default();

    if reader.convert("", &mut server) {
        println!("Successfully decoded: {server:?}");

        server.port = 9000;
        let mut writer = Writer::pretty(' ', 4);
        writer.convert("", &server);
        println!("Re-encoded with updated port:\n{}", writer.into_text());
    } else {
        eprintln!("Failed to decode: {:?}", reader.error());
    }
}
