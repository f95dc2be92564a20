use std::io;

error_chain! {
    foreign_links {
        Io(io::Error);
    }

    errors {
        ExportFailed(write_errors: usize, seek_errors: usize) {
            description("export failed")
            display("export failed: {} write error(s) and {} seek error(s) while writing the container", write_errors, seek_errors)
        }
        UnknownSlot(name: String) {
            description("unknown lump slot")
            display("unknown lump slot: {}", name)
        }
    }
}
