mod test_reconnect;
